//! Seams to the external rule engine and host document
//!
//! The engine decides what a violation is; this workspace never does. These
//! traits are the full surface the audit pipeline needs from it.

use crate::error::{EngineError, SelectorError};
use crate::report::AuditResult;
use crate::violation::{ElementRef, Level, RawViolation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Host document, reduced to what scoping needs
pub trait Document: Send + Sync {
    /// Resolve a local selector to its first match
    ///
    /// # Errors
    /// `SelectorError::Invalid` when the host cannot parse the selector
    fn query_selector(&self, selector: &str) -> Result<Option<ElementRef>, SelectorError>;

    /// Whether `node` is `ancestor` or one of its descendants
    fn contains(&self, ancestor: ElementRef, node: ElementRef) -> bool;
}

/// Static metadata for one rule
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleMetadata {
    /// Rule id
    pub id: String,
    /// What the rule checks
    #[serde(default)]
    pub description: Option<String>,
    /// How to fix a failure
    #[serde(default)]
    pub guidance: Option<String>,
    /// Conformance tier
    #[serde(default)]
    pub level: Option<Level>,
    /// Ordered standard references
    #[serde(default)]
    pub wcag: Vec<String>,
}

/// Lookup of rule metadata by id
pub trait RuleCatalog: Send + Sync {
    /// Metadata for `rule_id`, if the engine knows it
    fn rule(&self, rule_id: &str) -> Option<RuleMetadata>;
}

/// One audit that can be advanced in bounded slices
pub trait ChunkedAudit: Send {
    /// Run one slice of at most `budget`; `Ok(true)` if work remains
    ///
    /// # Errors
    /// `EngineError::ExecutionFailed` if a rule throws
    fn process_chunk(&mut self, budget: Duration) -> Result<bool, EngineError>;

    /// Accumulated results; read once after the final slice
    ///
    /// # Errors
    /// `EngineError::Incomplete` if slices remain
    fn results(&mut self) -> Result<AuditResult<RawViolation>, EngineError>;
}

/// The external rule engine
pub trait RuleEngine: RuleCatalog {
    /// Replace the disabled-rule set for subsequent audits
    fn configure(&self, disabled_rules: &BTreeSet<String>);

    /// Full blocking pass over `document`
    ///
    /// # Errors
    /// `EngineError::ExecutionFailed` if a rule throws
    fn run_audit(&self, document: &dyn Document) -> Result<AuditResult<RawViolation>, EngineError>;

    /// Start an incremental audit over `document`
    ///
    /// # Errors
    /// `EngineError::ExecutionFailed` if the audit cannot be set up
    fn start_chunked<'a>(
        &'a self,
        document: &'a dyn Document,
    ) -> Result<Box<dyn ChunkedAudit + 'a>, EngineError>;
}
