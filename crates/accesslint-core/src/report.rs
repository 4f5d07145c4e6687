//! Audit results and the versioned report envelope

use crate::error::ProtocolError;
use crate::violation::{EnrichedViolation, Violation};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::time::Duration;

/// `type` field of every report record
pub const REPORT_TYPE: &str = "accesslint";

/// Current report payload version; bumped only on breaking payload changes
pub const REPORT_VERSION: u32 = 1;

/// Snapshot of one audit pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult<V = Violation> {
    /// Violations found
    pub violations: Vec<V>,
    /// Number of rules that ran
    pub rule_count: u32,
}

impl<V> AuditResult<V> {
    /// Create result
    #[inline]
    #[must_use]
    pub fn new(violations: Vec<V>, rule_count: u32) -> Self {
        Self {
            violations,
            rule_count,
        }
    }

    /// Result with no violations
    #[inline]
    #[must_use]
    pub fn clean(rule_count: u32) -> Self {
        Self::new(Vec::new(), rule_count)
    }

    /// Map each violation, keeping the rule count
    pub fn map<U>(self, f: impl FnMut(V) -> U) -> AuditResult<U> {
        AuditResult {
            violations: self.violations.into_iter().map(f).collect(),
            rule_count: self.rule_count,
        }
    }
}

/// Aggregate summary published on the `meta` channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditMeta {
    /// Audit wall-clock duration in milliseconds
    pub duration: u64,
    /// Rules that ran
    pub rule_count: u32,
    /// Rules without a violation
    pub passed: u32,
    /// Distinct rules with at least one violation
    pub failed: u32,
    /// Total violations
    pub violations: u32,
}

impl AuditMeta {
    /// Derive meta from a result
    ///
    /// `failed` counts distinct rule ids, so `passed + failed == rule_count`
    /// holds as long as every violating rule actually ran.
    #[must_use]
    pub fn from_result<V: Borrow<Violation>>(result: &AuditResult<V>, duration: Duration) -> Self {
        let failed_rules: BTreeSet<&str> = result
            .violations
            .iter()
            .map(|v| v.borrow().rule_id.as_str())
            .collect();
        let failed = u32::try_from(failed_rules.len()).unwrap_or(u32::MAX);
        Self {
            duration: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            rule_count: result.rule_count,
            passed: result.rule_count.saturating_sub(failed),
            failed,
            violations: u32::try_from(result.violations.len()).unwrap_or(u32::MAX),
        }
    }
}

/// Marker payload for a story that was not audited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedAudit {
    #[serde(deserialize_with = "skip_marker")]
    skipped: bool,
    /// Tag that caused the skip
    pub reason: String,
}

/// Only a literal `true` marks a skip
fn skip_marker<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    if bool::deserialize(deserializer)? {
        Ok(true)
    } else {
        Err(serde::de::Error::invalid_value(
            serde::de::Unexpected::Bool(false),
            &"true",
        ))
    }
}

impl SkippedAudit {
    /// Skip caused by `reason`
    #[inline]
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            skipped: true,
            reason: reason.into(),
        }
    }
}

/// Either an audited result or a skip marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportOutcome {
    /// Story was excluded before any audit ran
    Skipped(SkippedAudit),
    /// Story was audited
    Audited(AuditResult<EnrichedViolation>),
}

impl ReportOutcome {
    /// Whether this is a skip marker
    #[inline]
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Violations, empty for skipped outcomes
    #[must_use]
    pub fn violations(&self) -> &[EnrichedViolation] {
        match self {
            Self::Skipped(_) => &[],
            Self::Audited(result) => &result.violations,
        }
    }

    /// Number of violations, zero for skipped outcomes
    #[inline]
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.violations().len()
    }
}

/// Overall verdict of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// No violations, or skipped
    Passed,
    /// Violations in advisory ("todo") mode
    Warning,
    /// Violations
    Failed,
}

/// Versioned envelope delivered to the reporting sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Always [`REPORT_TYPE`] for records this crate produces
    #[serde(rename = "type")]
    pub kind: String,
    /// Payload version
    pub version: u32,
    /// Outcome
    pub result: ReportOutcome,
    /// Verdict
    pub status: ReportStatus,
}

impl ReportRecord {
    /// Current-version record
    #[inline]
    #[must_use]
    pub fn new(result: ReportOutcome, status: ReportStatus) -> Self {
        Self {
            kind: REPORT_TYPE.to_string(),
            version: REPORT_VERSION,
            result,
            status,
        }
    }

    /// Record for a skipped story; always `passed`
    #[inline]
    #[must_use]
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::new(
            ReportOutcome::Skipped(SkippedAudit::new(reason)),
            ReportStatus::Passed,
        )
    }

    /// Parse a stored record, rejecting foreign types and other versions
    ///
    /// # Errors
    /// - `ProtocolError::UnsupportedReport` for another `type` or `version`
    /// - `ProtocolError::MalformedPayload` when the record shape is wrong
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProtocolError> {
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        let version = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or_default();
        if kind != REPORT_TYPE || version != REPORT_VERSION {
            return Err(ProtocolError::UnsupportedReport { kind, version });
        }
        serde_json::from_value(value).map_err(|source| ProtocolError::MalformedPayload {
            event: REPORT_TYPE.to_string(),
            source,
        })
    }
}

/// Synchronous test-runner reporting sink (`addReport`)
pub trait ReportSink: Send + Sync {
    /// Attach a record to the current test's report
    fn add_report(&self, record: &ReportRecord);
}
