//! Opt-in subscriber setup for binaries and demos built on this crate.

use std::env;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive, e.g. `cryptorank_rs=debug`.
pub const LOG_ENV: &str = "CRYPTORANK_LOG";

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive.
    pub level: String,
    /// Print the event's target module.
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Defaults overridden by `CRYPTORANK_LOG` when it is set and non-empty.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(level) = env::var(LOG_ENV) {
            let trimmed = level.trim();
            if !trimmed.is_empty() {
                config.level = trimmed.to_string();
            }
        }
        config
    }
}

/// Installing the global subscriber failed.
#[derive(Debug, Error)]
pub enum LoggingInitError {
    /// Another subscriber is already installed.
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Installs a fmt subscriber configured from [`LoggingConfig::from_env`].
///
/// # Errors
///
/// Fails if a global subscriber is already set.
pub fn init_tracing() -> Result<(), LoggingInitError> {
    init_tracing_with(&LoggingConfig::from_env())
}

/// Installs a fmt subscriber with explicit settings. An unparsable level falls back to `info`.
///
/// # Errors
///
/// Fails if a global subscriber is already set.
pub fn init_tracing_with(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.include_target)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
