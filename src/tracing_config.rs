use std::env;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const FORMAT_VAR: &str = "PROPTREE_LOG_FORMAT";

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human readable output.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Format named by `PROPTREE_LOG_FORMAT`, defaulting to pretty.
    pub fn from_env() -> Self {
        Self::parse(&env::var(FORMAT_VAR).unwrap_or_default())
    }

    fn parse(name: &str) -> Self {
        match name {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Initialize tracing for an application using the store
///
/// Uses RUST_LOG if set, otherwise "info". The output format comes from
/// PROPTREE_LOG_FORMAT ("json" or "pretty").
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    init_with_format(LogFormat::from_env())
}

/// Initialize tracing with an explicit output format
///
/// # Errors
/// Returns error if a global subscriber is already installed
pub fn init_with_format(format: LogFormat) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => {
            registry
                .with(fmt::layer().json().with_target(true).with_level(true))
                .try_init()?;
        }
        LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_level(true)
                        .with_thread_names(true),
                )
                .try_init()?;
        }
    }

    Ok(())
}
