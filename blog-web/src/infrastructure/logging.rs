use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// sqlx logs every statement at `info`; keep that out of the request log.
const DEFAULT_FILTER: &str = "info,blog_web=debug,sqlx=warn";

/// Builds the filter from `RUST_LOG`-style directives, falling back to
/// [`DEFAULT_FILTER`] when they are absent or do not parse.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_logging() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(directives.as_deref());
    let active_filter = filter.to_string();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!(filter = %active_filter, "Logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_directives_use_the_default() {
        assert_eq!(log_filter(None).to_string(), log_filter(Some(DEFAULT_FILTER)).to_string());
        assert_eq!(log_filter(Some("  ")).to_string(), log_filter(None).to_string());
    }

    #[test]
    fn explicit_directives_are_kept() {
        let filter = log_filter(Some("blog_web=trace")).to_string();

        assert!(filter.contains("blog_web=trace"));
        assert!(!filter.contains("sqlx"));
    }

    #[test]
    fn unparsable_directives_fall_back() {
        let filter = log_filter(Some("blog_web=notalevel")).to_string();

        assert!(filter.contains("sqlx=warn"));
    }
}
