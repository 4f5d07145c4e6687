//! One producer and one consumer over a shared bus
//!
//! Stands in for the host: it flips the test provider to `running`, renders
//! stories one at a time through the [`StoryAuditor`], and pumps whatever
//! the auditor published into the [`Manager`].

use accesslint_core::{
    ChannelBus, Document, MessageBus, ReportRecord, ReportSink, RuleEngine, Subscription,
};
use accesslint_manager::{HostCapabilities, Manager};
use accesslint_preview::{AuditConfig, ReportEmitter, StoryAuditor, StoryContext};
use parking_lot::Mutex;
use std::sync::Arc;

/// Reporting sink that stores records the way a test runner would, as JSON
#[derive(Debug, Default)]
pub struct JsonSink {
    stored: Mutex<Vec<serde_json::Value>>,
}

impl JsonSink {
    /// Empty sink
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored values
    #[must_use]
    pub fn stored(&self) -> Vec<serde_json::Value> {
        self.stored.lock().clone()
    }

    /// Stored records this build understands; others are logged and skipped
    #[must_use]
    pub fn records(&self) -> Vec<ReportRecord> {
        self.stored
            .lock()
            .iter()
            .filter_map(|value| match ReportRecord::from_value(value.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "stored report skipped");
                    None
                }
            })
            .collect()
    }

    /// Store a value directly, bypassing serialization of a record
    pub fn store(&self, value: serde_json::Value) {
        self.stored.lock().push(value);
    }
}

impl ReportSink for JsonSink {
    fn add_report(&self, record: &ReportRecord) {
        match serde_json::to_value(record) {
            Ok(value) => self.store(value),
            Err(e) => tracing::error!(error = %e, "report could not be stored"),
        }
    }
}

/// Outcome of one story in a batch
#[derive(Debug, Clone, PartialEq)]
pub struct StoryRun {
    /// Story id
    pub story_id: String,
    /// Record emitted for it, `None` if the audit was abandoned
    pub record: Option<ReportRecord>,
}

/// Producer, consumer, and the bus between them
#[derive(Debug)]
pub struct Session {
    auditor: StoryAuditor,
    manager: Manager,
    subscription: Subscription,
    sink: Arc<JsonSink>,
}

impl Session {
    /// Session over `engine` with the given host capabilities
    #[must_use]
    pub fn new(
        engine: Arc<dyn RuleEngine>,
        config: AuditConfig,
        capabilities: &HostCapabilities,
    ) -> Self {
        let bus = Arc::new(ChannelBus::default());
        let subscription = bus.subscribe();
        let sink = Arc::new(JsonSink::new());
        let emitter = ReportEmitter::new()
            .with_sink(sink.clone())
            .with_bus(bus.clone());
        Self {
            auditor: StoryAuditor::new(engine, config).with_emitter(emitter),
            manager: Manager::new(bus, capabilities),
            subscription,
            sink,
        }
    }

    /// Consumer side
    #[inline]
    #[must_use]
    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    /// Consumer side, for panel interaction
    #[inline]
    pub fn manager_mut(&mut self) -> &mut Manager {
        &mut self.manager
    }

    /// Reporting sink
    #[inline]
    #[must_use]
    pub fn sink(&self) -> &JsonSink {
        &self.sink
    }

    /// Start a test run on the provider
    pub fn begin_batch(&mut self) {
        if let Err(e) = self.manager.begin_run() {
            tracing::warn!(error = %e, "test provider not moved to running");
        }
    }

    /// Render and audit one story, then deliver its messages
    pub async fn audit_story(&mut self, story: &StoryContext, document: &dyn Document) -> StoryRun {
        self.auditor.select(Some(&story.story_id));
        let record = self.auditor.after_each(story, document).await;
        let delivered = self.manager.pump(&mut self.subscription);
        tracing::debug!(story = %story.story_id, delivered, "messages delivered");
        StoryRun {
            story_id: story.story_id.clone(),
            record,
        }
    }

    /// Run every story in order as one test run
    pub async fn run_batch(
        &mut self,
        stories: &[StoryContext],
        document: &dyn Document,
    ) -> Vec<StoryRun> {
        self.begin_batch();
        let mut runs = Vec::with_capacity(stories.len());
        for story in stories {
            runs.push(self.audit_story(story, document).await);
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_skips_foreign_records() {
        let sink = JsonSink::new();
        sink.add_report(&ReportRecord::skipped("no-a11y"));
        sink.store(serde_json::json!({ "type": "accesslint", "version": 9 }));

        assert_eq!(sink.stored().len(), 2);
        assert_eq!(sink.records(), vec![ReportRecord::skipped("no-a11y")]);
    }
}
