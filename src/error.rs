use std::error::Error as StdError;

use thiserror::Error;

/// cmcut's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// cmcut's crate-wide error type.
///
/// Codec-facing internals work with `anyhow`; everything that crosses the public API is mapped
/// into this enum so downstream crates can match on the failure kind.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed caller configuration (compositions, margins, duration units, frame rate).
    ///
    /// Raised eagerly at construction time, never while scanning.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unusable input data (empty or negative loudness, inverted frame ranges).
    #[error("input error: {0}")]
    Input(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Whether this error came from caller configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Whether this error came from the input data.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
