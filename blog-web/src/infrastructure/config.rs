use anyhow::{anyhow, Context, Result};
use chrono::FixedOffset;
use rand::RngCore;
use std::str::FromStr;

const DEFAULT_DATABASE_URL: &str = "sqlite://project.db?mode=rwc";
const GENERATED_SECRET_LEN: usize = 32;
/// One year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub http_host: String,
    pub http_port: u16,
    pub session_secret: Vec<u8>,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
    pub post_offset: FixedOffset,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let session_secret = match lookup("SESSION_SECRET") {
            Some(secret) if !secret.is_empty() => secret.into_bytes(),
            _ => {
                tracing::warn!(
                    "SESSION_SECRET is not set, generating one; sessions will not survive a restart"
                );
                let mut secret = vec![0u8; GENERATED_SECRET_LEN];
                rand::thread_rng().fill_bytes(&mut secret);
                secret
            }
        };

        let offset_hours: i32 = parse_or(&lookup, "POST_UTC_OFFSET_HOURS", 9)?;
        let post_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("POST_UTC_OFFSET_HOURS out of range: {}", offset_hours))?;

        let session_ttl_hours: i64 = parse_or(&lookup, "SESSION_TTL_HOURS", 24)?;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
            return Err(anyhow!(
                "SESSION_TTL_HOURS must be between 1 and {}, got {}",
                MAX_SESSION_TTL_HOURS,
                session_ttl_hours
            ));
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            http_host: lookup("HTTP_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            http_port: parse_or(&lookup, "HTTP_PORT", 3000)?,
            session_secret,
            session_ttl_hours,
            cookie_secure: parse_or(&lookup, "COOKIE_SECURE", false)?,
            post_offset,
        })
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.http_addr(), "127.0.0.1:3000");
        assert_eq!(config.session_ttl_hours, 24);
        assert_eq!(config.session_secret.len(), GENERATED_SECRET_LEN);
        assert_eq!(config.post_offset.local_minus_utc(), 9 * 3600);
        assert!(!config.cookie_secure);
    }

    #[test]
    fn generated_secrets_differ_between_starts() {
        let first = config_from(&[]).unwrap();
        let second = config_from(&[]).unwrap();
        assert_ne!(first.session_secret, second.session_secret);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = config_from(&[
            ("SESSION_SECRET", "a-very-long-secret-value"),
            ("HTTP_PORT", "8080"),
            ("POST_UTC_OFFSET_HOURS", "0"),
            ("COOKIE_SECURE", "true"),
        ])
        .unwrap();

        assert_eq!(config.session_secret, b"a-very-long-secret-value".to_vec());
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.post_offset.local_minus_utc(), 0);
        assert!(config.cookie_secure);
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(config_from(&[("HTTP_PORT", "not-a-port")]).is_err());
        assert!(config_from(&[("POST_UTC_OFFSET_HOURS", "30")]).is_err());
        assert!(config_from(&[("POST_UTC_OFFSET_HOURS", "1000000")]).is_err());
    }

    #[test]
    fn session_ttl_must_be_positive_and_bounded() {
        for bad in ["-5", "0", "3000000000000"] {
            assert!(
                config_from(&[("SESSION_TTL_HOURS", bad)]).is_err(),
                "SESSION_TTL_HOURS={} was accepted",
                bad
            );
        }

        let longest = MAX_SESSION_TTL_HOURS.to_string();
        let config = config_from(&[("SESSION_TTL_HOURS", longest.as_str())]).unwrap();
        assert_eq!(config.session_ttl_hours, MAX_SESSION_TTL_HOURS);
    }
}
