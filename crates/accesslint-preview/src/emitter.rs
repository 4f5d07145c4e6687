//! Report emission
//!
//! Every finished audit becomes exactly one [`ReportRecord`], delivered to
//! the synchronous reporting sink and then to the cross-context bus as a
//! `result` message. Audited outcomes are followed by a `meta` message.
//! Either channel may be absent.

use crate::config::TestMode;
use crate::error::AuditError;
use accesslint_core::{
    AuditMeta, AuditResult, EnrichedViolation, Message, MessageBus, ReportOutcome, ReportRecord,
    ReportSink, ReportStatus, ResultPayload,
};
use std::sync::Arc;

/// Status for an audited result with `violations` findings
#[inline]
#[must_use]
pub fn derive_status(violations: usize, mode: TestMode) -> ReportStatus {
    match (violations, mode) {
        (0, _) => ReportStatus::Passed,
        (_, TestMode::Todo) => ReportStatus::Warning,
        (_, TestMode::Error) => ReportStatus::Failed,
    }
}

/// Publishes report records on the sink and bus
#[derive(Clone, Default)]
pub struct ReportEmitter {
    sink: Option<Arc<dyn ReportSink>>,
    bus: Option<Arc<dyn MessageBus>>,
}

impl ReportEmitter {
    /// Emitter with no channels
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a reporting sink
    #[inline]
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// With a channel bus
    #[inline]
    #[must_use]
    pub fn with_bus(mut self, bus: Arc<dyn MessageBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Report a skipped story
    ///
    /// # Errors
    /// `AuditError::Protocol` if the bus message cannot be encoded
    pub fn emit_skipped(
        &self,
        story_id: Option<&str>,
        reason: &str,
    ) -> Result<ReportRecord, AuditError> {
        let record = ReportRecord::skipped(reason);
        self.deliver(story_id, &record)?;
        tracing::info!(story = story_id.unwrap_or("-"), reason, "story skipped");
        Ok(record)
    }

    /// Report an audited story, followed by its meta summary
    ///
    /// # Errors
    /// `AuditError::Protocol` if a bus message cannot be encoded
    pub fn emit_audited(
        &self,
        story_id: Option<&str>,
        result: AuditResult<EnrichedViolation>,
        status: ReportStatus,
        meta: AuditMeta,
    ) -> Result<ReportRecord, AuditError> {
        let violations = result.violations.len();
        let record = ReportRecord::new(ReportOutcome::Audited(result), status);
        self.deliver(story_id, &record)?;
        if let Some(bus) = &self.bus {
            bus.send(&Message::Meta(meta))?;
        }
        tracing::info!(
            story = story_id.unwrap_or("-"),
            violations,
            ?status,
            duration_ms = meta.duration,
            "audit reported"
        );
        Ok(record)
    }

    fn deliver(&self, story_id: Option<&str>, record: &ReportRecord) -> Result<(), AuditError> {
        if let Some(sink) = &self.sink {
            sink.add_report(record);
        }
        if let Some(bus) = &self.bus {
            bus.send(&Message::Result(ResultPayload {
                story_id: story_id.map(str::to_string),
                result: record.result.clone(),
                status: Some(record.status),
            }))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ReportEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportEmitter")
            .field("sink", &self.sink.is_some())
            .field("bus", &self.bus)
            .finish()
    }
}
