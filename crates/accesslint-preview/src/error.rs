//! Error types for the audit pipeline

use accesslint_core::{EngineError, ProtocolError};
use std::path::PathBuf;

/// Audit pipeline errors
///
/// None of these escape [`crate::StoryAuditor`]; they are logged there and
/// the audit pass is abandoned.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Rule engine failed
    #[error("rule engine failed: {0}")]
    Engine(#[from] EngineError),

    /// A run for the same unit has not finished
    #[error("audit already in flight for {unit}")]
    AlreadyInFlight {
        /// Unit under test
        unit: String,
    },

    /// Result could not be encoded for the channel
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl AuditError {
    /// Whether retrying the same story later can succeed
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::AlreadyInFlight { .. })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML did not parse
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed but semantically invalid
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_flight_is_recoverable() {
        let err = AuditError::AlreadyInFlight {
            unit: "button--primary".into(),
        };
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("button--primary"));
        assert!(!AuditError::Engine(EngineError::Incomplete).is_recoverable());
    }
}
