use crate::domain::user::SessionSubject;
use crate::domain::DomainError;
use actix_web::cookie::{time, Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i64,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

/// Signs and verifies the session token stored in the [`SESSION_COOKIE`].
pub struct SessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionTokens {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        if secret.len() < 32 {
            tracing::warn!(
                "Session secret is too short ({} bytes). Minimum recommended is 32 bytes.",
                secret.len()
            );
        }

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn issue(&self, subject: &impl SessionSubject) -> Result<String, DomainError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            DomainError::InternalError(format!("Session lifetime out of range: {}", self.ttl))
        })?;
        let claims = SessionClaims {
            user_id: subject.subject_id(),
            username: subject.subject_name().to_string(),
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp().max(0) as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode session token: {}", e);
            DomainError::InternalError(format!("Failed to issue session: {}", e))
        })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, DomainError> {
        decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Session token rejected: {}", e);
                DomainError::Unauthorized(format!("Invalid session: {}", e))
            })
    }
}

/// Attributes of the cookie that carries the session token.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    ttl: Duration,
    secure: bool,
}

impl SessionCookie {
    pub fn new(ttl: Duration, secure: bool) -> Self {
        Self { ttl, secure }
    }

    pub fn build(&self, token: String) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::seconds(self.ttl.num_seconds()))
            .finish()
    }

    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
        cookie.make_removal();
        cookie
    }
}
