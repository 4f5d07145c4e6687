//! Per-story sidebar status
//!
//! Pure mapping from one report to the record shown next to the story. It is
//! recomputed on every report; nothing is carried over from earlier ones.

use accesslint_core::{ReportOutcome, ReportStatus, STATUS_TYPE_ID};
use serde::{Deserialize, Serialize};

/// Title shown on every status record
pub const STATUS_TITLE: &str = "AccessLint";

/// Sidebar status value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusValue {
    /// Skipped or never audited
    #[serde(rename = "status-value:unknown")]
    Unknown,
    /// No violations
    #[serde(rename = "status-value:success")]
    Success,
    /// Violations in advisory mode
    #[serde(rename = "status-value:warning")]
    Warning,
    /// Violations
    #[serde(rename = "status-value:error")]
    Error,
}

/// Status entry for one story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    /// Story identifier
    pub story_id: String,
    /// Always [`STATUS_TYPE_ID`]
    pub type_id: String,
    /// Derived value
    pub value: StatusValue,
    /// Always [`STATUS_TITLE`]
    pub title: String,
    /// Human-readable summary
    pub description: String,
    /// Offer the "view results" context-menu entry
    pub sidebar_context_menu: bool,
}

/// Map an outcome and its reported status to a sidebar value
#[must_use]
pub fn status_value(outcome: &ReportOutcome, status: Option<ReportStatus>) -> StatusValue {
    if outcome.is_skipped() {
        return StatusValue::Unknown;
    }
    match (outcome.violation_count(), status) {
        (0, _) => StatusValue::Success,
        (_, Some(ReportStatus::Warning)) => StatusValue::Warning,
        _ => StatusValue::Error,
    }
}

/// `"Skipped"`, `"No violations"`, or `"N violation(s)"`
#[must_use]
pub fn status_description(outcome: &ReportOutcome) -> String {
    if outcome.is_skipped() {
        return "Skipped".to_string();
    }
    match outcome.violation_count() {
        0 => "No violations".to_string(),
        n => pluralize_violations(n),
    }
}

/// `"1 violation"`, `"N violations"`
#[must_use]
pub fn pluralize_violations(n: usize) -> String {
    if n == 1 {
        "1 violation".to_string()
    } else {
        format!("{n} violations")
    }
}

impl StatusRecord {
    /// Record for `story_id` derived from one report
    #[must_use]
    pub fn from_report(
        story_id: impl Into<String>,
        outcome: &ReportOutcome,
        status: Option<ReportStatus>,
    ) -> Self {
        Self {
            story_id: story_id.into(),
            type_id: STATUS_TYPE_ID.to_string(),
            value: status_value(outcome, status),
            title: STATUS_TITLE.to_string(),
            description: status_description(outcome),
            sidebar_context_menu: true,
        }
    }
}
