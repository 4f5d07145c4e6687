//! Violation data model
//!
//! A [`Violation`] is what the rule engine reports for one element. The engine
//! hands violations over as [`RawViolation`], which may still carry a live
//! element handle; only [`EnrichedViolation`] is serializable and may cross
//! the protocol boundary.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Severity band of a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Blocks access entirely
    Critical,
    /// Severely degrades access
    Serious,
    /// Noticeable barrier
    Moderate,
    /// Annoyance
    Minor,
}

impl Impact {
    /// Sort rank used by the panel; critical and serious share a rank
    #[inline]
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Impact::Critical | Impact::Serious => 0,
            Impact::Moderate => 1,
            Impact::Minor => 2,
        }
    }

    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Impact::Critical => "critical",
            Impact::Serious => "serious",
            Impact::Moderate => "moderate",
            Impact::Minor => "minor",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conformance tier a rule maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    /// Level A
    A,
    /// Level AA
    AA,
    /// Level AAA
    AAA,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::A => "A",
            Level::AA => "AA",
            Level::AAA => "AAA",
        };
        f.write_str(s)
    }
}

/// A single detected rule failure, tied to one element via a selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Rule that failed
    pub rule_id: String,
    /// Selector of the offending element (may be boundary-piercing)
    pub selector: String,
    /// Outer HTML snippet of the element
    pub html: String,
    /// Severity
    pub impact: Impact,
    /// Human-readable failure message
    pub message: String,
    /// Extra engine-provided context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Violation {
    /// Create violation with empty html and no context
    #[inline]
    #[must_use]
    pub fn new(
        rule_id: impl Into<String>,
        selector: impl Into<String>,
        impact: Impact,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            selector: selector.into(),
            html: String::new(),
            impact,
            message: message.into(),
            context: None,
        }
    }

    /// With html snippet
    #[inline]
    #[must_use]
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = html.into();
        self
    }

    /// With engine context
    #[inline]
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Opaque handle to a host element
///
/// Deliberately not `Serialize`: handles are only meaningful inside the
/// document that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(pub u64);

/// Violation as produced by the rule engine, before enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawViolation {
    /// The violation itself
    pub violation: Violation,
    /// Element the engine attached, if any
    pub element: Option<ElementRef>,
}

impl RawViolation {
    /// Wrap a violation without an element handle
    #[inline]
    #[must_use]
    pub fn new(violation: Violation) -> Self {
        Self {
            violation,
            element: None,
        }
    }

    /// Attach element handle
    #[inline]
    #[must_use]
    pub fn with_element(mut self, element: ElementRef) -> Self {
        self.element = Some(element);
        self
    }
}

impl From<Violation> for RawViolation {
    fn from(violation: Violation) -> Self {
        Self::new(violation)
    }
}

impl Borrow<Violation> for RawViolation {
    fn borrow(&self) -> &Violation {
        &self.violation
    }
}

/// Violation joined with static rule metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedViolation {
    /// Unchanged engine violation
    #[serde(flatten)]
    pub violation: Violation,
    /// Rule description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered standard references (e.g. "1.4.3")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wcag: Option<Vec<String>>,
    /// Conformance tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    /// Remediation guidance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

impl EnrichedViolation {
    /// Enriched violation with no metadata
    #[inline]
    #[must_use]
    pub fn bare(violation: Violation) -> Self {
        Self {
            violation,
            description: None,
            wcag: None,
            level: None,
            guidance: None,
        }
    }

    /// Shortcut to the rule id
    #[inline]
    #[must_use]
    pub fn rule_id(&self) -> &str {
        &self.violation.rule_id
    }

    /// Shortcut to the selector
    #[inline]
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.violation.selector
    }

    /// Shortcut to the impact
    #[inline]
    #[must_use]
    pub fn impact(&self) -> Impact {
        self.violation.impact
    }
}

impl Borrow<Violation> for EnrichedViolation {
    fn borrow(&self) -> &Violation {
        &self.violation
    }
}
