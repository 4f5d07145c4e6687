//! AccessLint Core
//!
//! Shared vocabulary for both sides of the audit boundary:
//! - Violation, enrichment, and report data model
//! - The cross-context protocol (event names, payloads, envelopes)
//! - An ordered in-process message bus
//! - Seams for the external rule engine and the host document
//!
//! Nothing here runs an audit or keeps UI state; the producer lives in
//! `accesslint-preview` and the consumers in `accesslint-manager`.
//!
//! # Example
//!
//! ```rust,ignore
//! use accesslint_core::{ChannelBus, Message, MessageBus, RESULT_EVENT};
//!
//! let bus = ChannelBus::new(64);
//! let mut sub = bus.subscribe();
//! bus.send(&Message::Result(payload))?;
//! let envelope = sub.try_next().unwrap();
//! assert_eq!(envelope.event, RESULT_EVENT);
//! ```

#![warn(unreachable_pub)]

pub mod bus;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod report;
pub mod selector;
pub mod violation;

pub use bus::{ChannelBus, MessageBus, Subscription};
pub use engine::{ChunkedAudit, Document, RuleCatalog, RuleEngine, RuleMetadata};
pub use error::{EngineError, ProtocolError, SelectorError};
pub use protocol::{
    Envelope, HighlightRemoval, HighlightRequest, HighlightStyle, Message, ResultPayload,
    ADDON_ID, HIGHLIGHT_ADD_EVENT, HIGHLIGHT_REMOVE_EVENT, META_EVENT, PANEL_ID,
    RESULT_EVENT, STATUS_TYPE_ID, TEST_PROVIDER_ID,
};
pub use report::{
    AuditMeta, AuditResult, ReportOutcome, ReportRecord, ReportSink, ReportStatus, SkippedAudit,
    REPORT_TYPE, REPORT_VERSION,
};
pub use selector::{is_piercing, local_selector, PIERCE_COMBINATOR};
pub use violation::{ElementRef, EnrichedViolation, Impact, Level, RawViolation, Violation};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
