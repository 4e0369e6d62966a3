//! Error types for Flurry.
//!
//! Spawning and ticking are total and never fail; errors only come from
//! loading or validating configuration and from building a simulation.

use std::path::PathBuf;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The TOML document could not be parsed into a config.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is syntactically fine but outside its allowed domain.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending option.
        field: &'static str,
        /// Human readable constraint that was violated.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised when building or starting a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// Rules, spawn templates, emitters or limits failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The simulation area has zero or negative extent, or is not finite.
    #[error("simulation bounds must be finite with positive width and height")]
    InvalidBounds,

    /// The tick source was already stopped when the session started.
    #[error("tick source is stopped; cannot start a session")]
    TickSourceStopped,
}
