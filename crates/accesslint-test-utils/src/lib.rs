//! Testing utilities for the AccessLint workspace
//!
//! Shared fakes for every external seam, plus builders and JSON fixtures.

#![allow(missing_docs)]

pub mod document;
pub mod engine;
pub mod fixture;

pub use document::{DocumentError, FakeDocument};
pub use engine::{EngineCounters, ScriptedEngine};
pub use fixture::{ElementFixture, SessionFixture, StoryFixture};

use accesslint_core::{
    EnrichedViolation, Impact, Level, ReportRecord, ReportSink, RuleMetadata, Violation,
};
use parking_lot::Mutex;

pub fn violation(rule_id: &str, selector: &str, impact: Impact) -> Violation {
    Violation::new(rule_id, selector, impact, format!("{rule_id} failed"))
        .with_html(format!("<div data-rule=\"{rule_id}\"></div>"))
}

pub fn enriched(rule_id: &str, selector: &str, impact: Impact) -> EnrichedViolation {
    EnrichedViolation::bare(violation(rule_id, selector, impact))
}

pub fn rule(id: &str, level: Level, wcag: &[&str]) -> RuleMetadata {
    RuleMetadata {
        id: id.to_string(),
        description: Some(format!("{id} description")),
        guidance: Some(format!("Fix {id}")),
        level: Some(level),
        wcag: wcag.iter().map(|s| (*s).to_string()).collect(),
    }
}

/// Sink that keeps every record it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<ReportRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ReportRecord> {
        self.records.lock().clone()
    }

    pub fn last(&self) -> Option<ReportRecord> {
        self.records.lock().last().cloned()
    }
}

impl ReportSink for RecordingSink {
    fn add_report(&self, record: &ReportRecord) {
        self.records.lock().push(record.clone());
    }
}
