//! Log output for the gradebook binaries.
//!
//! Grading traces (fail-closed formulas, roster fan-out) go to stderr so that reports on
//! stdout stay machine readable.

use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

/// Crates whose events follow `GRADEBOOK_LOG_LEVEL`; dependencies stay at `warn`.
const GRADEBOOK_TARGETS: [&str; 2] = ["gradebook", "gradebook_cli"];

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("log filter '{value}' is invalid")]
    InvalidFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Expands a bare level such as `debug` into per-crate directives. Values that already
/// carry directives (`target=level` or comma lists) are used verbatim.
pub fn filter_directives(log_level: &str) -> String {
    let level = log_level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }

    let mut directives = vec!["warn".to_string()];
    directives.extend(
        GRADEBOOK_TARGETS
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives.join(",")
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}

fn build_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = filter_directives(log_level);
    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::InvalidFilter {
        value: directives,
        source,
    })
}
