//! Test-provider widget and panel title summary

use crate::status::pluralize_violations;
use accesslint_core::ReportOutcome;
use serde::{Deserialize, Serialize};

/// Dot colour class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    /// No report yet
    Unknown,
    /// Zero violations
    Positive,
    /// At least one violation
    Negative,
}

/// Latest-report summary shared by the widget and the panel title
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetSummary {
    count: Option<usize>,
}

impl WidgetSummary {
    /// Summary before any report
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace with the latest outcome; skipped counts as zero
    pub fn record(&mut self, outcome: &ReportOutcome) {
        self.count = Some(outcome.violation_count());
    }

    /// Violation count, `None` before any report
    #[inline]
    #[must_use]
    pub fn count(&self) -> Option<usize> {
        self.count
    }

    /// Status dot
    #[must_use]
    pub fn indicator(&self) -> Indicator {
        match self.count {
            None => Indicator::Unknown,
            Some(0) => Indicator::Positive,
            Some(_) => Indicator::Negative,
        }
    }

    /// Accessible label of the widget button
    #[must_use]
    pub fn aria_label(&self) -> String {
        match self.count {
            None => "AccessLint: not run yet".to_string(),
            Some(0) => "AccessLint: no violations".to_string(),
            Some(n) => format!("AccessLint: {}", pluralize_violations(n)),
        }
    }

    /// Count badge next to the panel title, only when non-zero
    #[must_use]
    pub fn title_badge(&self) -> Option<usize> {
        self.count.filter(|n| *n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accesslint_core::{AuditResult, Impact, SkippedAudit};
    use accesslint_test_utils::enriched;

    #[test]
    fn before_any_report() {
        let summary = WidgetSummary::new();
        assert_eq!(summary.indicator(), Indicator::Unknown);
        assert_eq!(summary.aria_label(), "AccessLint: not run yet");
        assert_eq!(summary.title_badge(), None);
    }

    #[test]
    fn tracks_latest_report() {
        let mut summary = WidgetSummary::new();
        summary.record(&ReportOutcome::Audited(AuditResult::new(
            vec![
                enriched("a", "#a", Impact::Minor),
                enriched("b", "#b", Impact::Minor),
            ],
            4,
        )));
        assert_eq!(summary.indicator(), Indicator::Negative);
        assert_eq!(summary.aria_label(), "AccessLint: 2 violations");
        assert_eq!(summary.title_badge(), Some(2));

        summary.record(&ReportOutcome::Skipped(SkippedAudit::new("no-a11y")));
        assert_eq!(summary.count(), Some(0));
        assert_eq!(summary.indicator(), Indicator::Positive);
        assert_eq!(summary.aria_label(), "AccessLint: no violations");
        assert_eq!(summary.title_badge(), None);
    }
}
