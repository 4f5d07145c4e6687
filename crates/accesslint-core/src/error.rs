//! Error types shared across the audit boundary
//!
//! Every error here is non-fatal by construction: callers log and degrade
//! (drop a violation, ignore a payload, abandon one audit pass).

use crate::protocol::ADDON_ID;

/// Protocol encode/decode failures
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Event name not part of this protocol
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Payload did not match the event's shape
    #[error("malformed payload for {event}: {source}")]
    MalformedPayload {
        /// Event whose payload failed
        event: String,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },

    /// Report record of a type or version this build does not understand
    #[error("unsupported report {kind} v{version}")]
    UnsupportedReport {
        /// Record `type`
        kind: String,
        /// Record `version`
        version: u32,
    },
}

impl ProtocolError {
    /// Whether the message simply belongs to someone else on the channel
    ///
    /// Unknown events inside this addon's namespace are not foreign: they
    /// come from a producer speaking another protocol revision.
    #[inline]
    #[must_use]
    pub fn is_foreign(&self) -> bool {
        matches!(self, Self::UnknownEvent(event) if !event.starts_with(ADDON_ID))
    }
}

/// Rule engine faults
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Audit threw while running
    #[error("audit execution failed: {0}")]
    ExecutionFailed(String),

    /// Results requested before the audit finished
    #[error("audit not complete")]
    Incomplete,
}

/// Selector resolution failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// Selector could not be parsed by the host
    #[error("invalid selector: {0}")]
    Invalid(String),
}
