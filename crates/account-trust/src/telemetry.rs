//! Tracing bootstrap for the account trust services.
//!
//! Service events carry owner and record ids, card brand and last4 only. Card numbers,
//! CVVs and full account numbers never reach a span or event.

use std::env;

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("telemetry error: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Install the process-wide subscriber.
///
/// A parseable `RUST_LOG` wins; otherwise `APP_LOG_LEVEL` (via [`TelemetryConfig`]) is used.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(env::var("RUST_LOG").ok().as_deref(), config)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

fn build_filter(
    rust_log: Option<&str>,
    config: &TelemetryConfig,
) -> Result<EnvFilter, TelemetryError> {
    if let Some(filter) = rust_log.and_then(|value| EnvFilter::try_new(value).ok()) {
        return Ok(filter);
    }

    EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::EnvFilter {
        value: config.log_level.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    fn config(level: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_level: level.to_string(),
        }
    }

    #[test]
    fn rust_log_overrides_configured_level() {
        let filter = build_filter(Some("account_trust=debug"), &config("warn")).expect("filter");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn unparseable_rust_log_falls_back_to_config() {
        let filter = build_filter(Some("account_trust=loud"), &config("warn")).expect("filter");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn invalid_configured_level_is_reported() {
        match build_filter(None, &config("account_trust=loud")) {
            Err(TelemetryError::EnvFilter { value, .. }) => assert_eq!(value, "account_trust=loud"),
            other => panic!("expected filter error, got {other:?}"),
        }
    }
}
