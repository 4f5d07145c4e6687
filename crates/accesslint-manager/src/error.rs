//! Error types for the consumer side

use crate::provider::TestProviderState;
use accesslint_core::ProtocolError;

/// Consumer-side errors
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// Test-provider transition outside the lifecycle
    #[error("illegal test-provider transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current state
        from: TestProviderState,
        /// Requested state
        to: TestProviderState,
    },

    /// Inbound message could not be understood
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl ManagerError {
    /// Whether the message should simply be ignored
    #[inline]
    #[must_use]
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}
