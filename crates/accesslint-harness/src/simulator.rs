//! Fixture-driven simulator
//!
//! Loads a [`SessionFixture`], audits each story as one test run, and
//! reports what every surface ended up showing.

use crate::session::Session;
use accesslint_core::{AuditMeta, Document, ReportOutcome, ReportStatus};
use accesslint_manager::{
    HostCapabilities, Indicator, MemoryStatusStore, MemoryTestProvider, StatusValue,
    TestProviderState,
};
use accesslint_preview::{AuditConfig, StoryContext};
use accesslint_test_utils::{DocumentError, SessionFixture};
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;

/// Per-story line of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryReport {
    /// Story id
    pub story_id: String,
    /// Reported verdict; `None` when no report was emitted
    pub status: Option<ReportStatus>,
    /// Violations reported
    pub violations: usize,
    /// Skip tag, if the story was skipped
    pub skipped: Option<String>,
    /// Sidebar status after the report
    pub sidebar: Option<StatusValue>,
}

/// Simulator outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorReport {
    /// One entry per fixture story, in order
    pub stories: Vec<StoryReport>,
    /// Final test-provider state
    pub provider_state: Option<TestProviderState>,
    /// Widget indicator after the last report
    pub indicator: Indicator,
    /// Last aggregate summary
    pub last_meta: Option<AuditMeta>,
    /// Envelopes the consumer could not use
    pub ignored: usize,
}

impl SimulatorReport {
    /// No story failed and every story produced a report
    #[must_use]
    pub fn passed(&self) -> bool {
        self.stories
            .iter()
            .all(|s| matches!(s.status, Some(ReportStatus::Passed | ReportStatus::Warning)))
    }

    /// Total violations across stories
    #[must_use]
    pub fn total_violations(&self) -> usize {
        self.stories.iter().map(|s| s.violations).sum()
    }

    /// Human-readable report
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();

        report.push_str("=== AccessLint Simulator Report ===\n\n");
        let _ = writeln!(report, "Stories: {}", self.stories.len());
        let _ = writeln!(report, "Violations: {}", self.total_violations());
        if let Some(state) = self.provider_state {
            let _ = writeln!(report, "Test Provider: {state:?}");
        }
        let _ = writeln!(report, "Indicator: {:?}", self.indicator);
        if let Some(meta) = self.last_meta {
            let _ = writeln!(
                report,
                "Last Audit: {} rules, {} passed, {} failed, {}ms",
                meta.rule_count, meta.passed, meta.failed, meta.duration
            );
        }
        if self.ignored > 0 {
            let _ = writeln!(report, "Ignored Messages: {}", self.ignored);
        }

        report.push_str("\n=== Stories ===\n");
        for (i, story) in self.stories.iter().enumerate() {
            let verdict = match (&story.skipped, story.status) {
                (Some(tag), _) => format!("skipped ({tag})"),
                (None, Some(status)) => format!("{status:?} ({} violations)", story.violations),
                (None, None) => "no report".to_string(),
            };
            let _ = writeln!(report, "{}. {}: {verdict}", i + 1, story.story_id);
        }

        let _ = write!(
            report,
            "\n=== Result: {} ===\n",
            if self.passed() { "PASS" } else { "FAIL" }
        );
        report
    }
}

/// Run every fixture story through a full session
///
/// # Errors
/// `DocumentError` if the fixture's element tree is inconsistent
pub async fn run_simulator(
    fixture: &SessionFixture,
    config: AuditConfig,
) -> Result<SimulatorReport, DocumentError> {
    let engine = Arc::new(fixture.engine());
    let document = fixture.document()?;
    let status_store = Arc::new(MemoryStatusStore::new());
    let capabilities = HostCapabilities::panel_only()
        .with_status_store(status_store.clone())
        .with_test_provider(Arc::new(MemoryTestProvider::new()));
    let mut session = Session::new(engine.clone(), config, &capabilities);

    session.begin_batch();
    let mut stories = Vec::with_capacity(fixture.stories.len());
    for story in &fixture.stories {
        engine.load(story.violations.clone());
        engine.set_slices(story.slices);

        let root = story
            .root
            .as_deref()
            .and_then(|selector| match document.query_selector(selector) {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(story = %story.id, error = %e, "root not resolvable; unscoped");
                    None
                }
            });
        let mut context = StoryContext::new(story.id.clone()).with_tags(story.tags.clone());
        context.root = root;

        let run = session.audit_story(&context, &document).await;
        let record = run.record.as_ref();
        stories.push(StoryReport {
            story_id: run.story_id.clone(),
            status: record.map(|r| r.status),
            violations: record.map_or(0, |r| r.result.violation_count()),
            skipped: record.and_then(|r| match &r.result {
                ReportOutcome::Skipped(s) => Some(s.reason.clone()),
                ReportOutcome::Audited(_) => None,
            }),
            sidebar: status_store.get(&run.story_id).map(|s| s.value),
        });
    }

    let manager = session.manager();
    Ok(SimulatorReport {
        stories,
        provider_state: manager.provider_state(),
        indicator: manager.summary().indicator(),
        last_meta: manager.last_meta(),
        ignored: manager.ignored(),
    })
}
