//! Installs the global subscriber.

use tracing_subscriber::EnvFilter;

use crate::config::{Format, LogConfig};
use crate::error::LogError;

impl LogConfig {
    /// The `EnvFilter` for [`level`](Self::level).
    pub fn filter(&self) -> Result<EnvFilter, LogError> {
        EnvFilter::try_new(&self.level).map_err(|e| LogError::Filter {
            filter: self.level.clone(),
            reason: e.to_string(),
        })
    }

    /// Install this configuration as the global subscriber.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the filter directives do not parse
    /// - a global subscriber is already installed
    pub fn init(&self) -> Result<(), LogError> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.filter()?)
            .with_ansi(self.ansi)
            .with_target(self.target);

        let result = match self.format {
            Format::Compact => builder.compact().try_init(),
            Format::Pretty => builder.pretty().try_init(),
            Format::Json => builder.json().try_init(),
        };
        result.map_err(|e| LogError::AlreadyInitialized(e.to_string()))?;

        tracing::debug!(level = %self.level, format = %self.format, "logger initialized");
        Ok(())
    }
}

/// Install the environment's configuration unless a subscriber is already
/// installed. Meant for tests, which may all call it.
///
/// # Errors
///
/// Returns error if the filter directives from the environment do not parse.
pub fn try_init() -> Result<(), LogError> {
    match LogConfig::from_env().init() {
        Err(LogError::AlreadyInitialized(_)) | Ok(()) => Ok(()),
        Err(err) => Err(err),
    }
}
