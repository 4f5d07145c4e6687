//! Per-story audit pipeline
//!
//! Runs after each rendered story:
//! 1. Skip check against the story's tags (the engine is never touched)
//! 2. Push disabled rules to the engine
//! 3. Chunked or single-shot audit
//! 4. Scope to the story root
//! 5. Drop disabled rules, enrich
//! 6. Derive status and meta, emit
//!
//! Faults stop at this boundary: they are logged and the story gets no
//! report.

use crate::config::AuditConfig;
use crate::emitter::{derive_status, ReportEmitter};
use crate::enrich::Enricher;
use crate::error::AuditError;
use crate::scheduler::{AuditScheduler, TaskYield, Yielder};
use crate::scope::scope_violations;
use crate::skip::SkipPolicy;
use crate::tracker::RunTracker;
use accesslint_core::{
    AuditMeta, AuditResult, Document, ElementRef, RawViolation, ReportRecord, RuleEngine,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The story being audited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryContext {
    /// Host story identifier
    pub story_id: String,
    /// Story tags
    pub tags: Vec<String>,
    /// Root container; `None` disables scoping
    pub root: Option<ElementRef>,
}

impl StoryContext {
    /// Context with no tags and no root
    #[inline]
    #[must_use]
    pub fn new(story_id: impl Into<String>) -> Self {
        Self {
            story_id: story_id.into(),
            tags: Vec::new(),
            root: None,
        }
    }

    /// With tags
    #[inline]
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// With root container
    #[inline]
    #[must_use]
    pub fn with_root(mut self, root: ElementRef) -> Self {
        self.root = Some(root);
        self
    }
}

/// Audits rendered stories and reports the outcome
pub struct StoryAuditor<Y = TaskYield> {
    engine: Arc<dyn RuleEngine>,
    config: AuditConfig,
    skip: SkipPolicy,
    scheduler: AuditScheduler<Y>,
    emitter: ReportEmitter,
    tracker: RunTracker,
}

impl StoryAuditor<TaskYield> {
    /// Auditor with no report channels
    #[must_use]
    pub fn new(engine: Arc<dyn RuleEngine>, config: AuditConfig) -> Self {
        let skip = SkipPolicy::from_config(&config);
        let scheduler = AuditScheduler::new(config.slice_budget());
        Self {
            engine,
            config,
            skip,
            scheduler,
            emitter: ReportEmitter::new(),
            tracker: RunTracker::new(),
        }
    }
}

impl<Y: Yielder> StoryAuditor<Y> {
    /// With report channels
    #[inline]
    #[must_use]
    pub fn with_emitter(mut self, emitter: ReportEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// With a custom scheduler suspension point
    #[must_use]
    pub fn with_yielder<Z: Yielder>(self, yielder: Z) -> StoryAuditor<Z> {
        StoryAuditor {
            scheduler: AuditScheduler::with_yielder(self.scheduler.budget(), yielder),
            engine: self.engine,
            config: self.config,
            skip: self.skip,
            emitter: self.emitter,
            tracker: self.tracker,
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Record that the host moved to another story, or tore one down
    pub fn select(&self, story_id: Option<&str>) {
        tracing::debug!(story = story_id.unwrap_or("-"), "story selected");
        self.tracker.select(story_id);
    }

    /// Audit a rendered story and report it
    ///
    /// `None` when the audit failed, was already in flight, or went stale
    /// before it finished.
    pub async fn after_each(
        &self,
        story: &StoryContext,
        document: &dyn Document,
    ) -> Option<ReportRecord> {
        if let Some(tag) = self.skip.matched(story.tags.as_slice()) {
            tracing::debug!(story = %story.story_id, tag, "skip tag present");
            return self
                .emitter
                .emit_skipped(Some(&story.story_id), tag)
                .map_err(|e| self.abandon(&story.story_id, &e))
                .ok();
        }

        match self.audit(story, document).await {
            Ok(record) => record,
            Err(e) => {
                self.abandon(&story.story_id, &e);
                None
            }
        }
    }

    /// Blocking single-shot audit for interactive re-runs
    pub fn audit_rendered(
        &self,
        story: &StoryContext,
        document: &dyn Document,
    ) -> Option<ReportRecord> {
        let run = || -> Result<ReportRecord, AuditError> {
            let _ticket = self.tracker.begin(&story.story_id)?;
            self.engine.configure(&self.config.disabled_rules);
            let started = Instant::now();
            let raw = self.engine.run_audit(document)?;
            self.report(story, document, raw, started.elapsed())
        };
        run().map_err(|e| self.abandon(&story.story_id, &e)).ok()
    }

    async fn audit(
        &self,
        story: &StoryContext,
        document: &dyn Document,
    ) -> Result<Option<ReportRecord>, AuditError> {
        let ticket = self.tracker.begin(&story.story_id)?;
        self.engine.configure(&self.config.disabled_rules);

        let started = Instant::now();
        let raw = if self.config.chunked {
            let mut audit = self.engine.start_chunked(document)?;
            self.scheduler.run(audit.as_mut()).await?.result
        } else {
            self.engine.run_audit(document)?
        };
        let elapsed = started.elapsed();

        if !ticket.is_current() {
            tracing::debug!(
                story = %story.story_id,
                run = %ticket.id(),
                "story changed during audit; result discarded"
            );
            return Ok(None);
        }
        self.report(story, document, raw, elapsed).map(Some)
    }

    fn report(
        &self,
        story: &StoryContext,
        document: &dyn Document,
        raw: AuditResult<RawViolation>,
        elapsed: Duration,
    ) -> Result<ReportRecord, AuditError> {
        let AuditResult {
            violations,
            rule_count,
        } = raw;
        let kept: Vec<RawViolation> = scope_violations(violations, document, story.root)
            .into_iter()
            .filter(|v| !self.config.disabled_rules.contains(&v.violation.rule_id))
            .collect();

        let enricher = Enricher::new(self.engine.as_ref());
        let result = AuditResult::new(enricher.enrich_all(kept), rule_count);
        let status = derive_status(result.violations.len(), self.config.test);
        let meta = AuditMeta::from_result(&result, elapsed);
        self.emitter
            .emit_audited(Some(&story.story_id), result, status, meta)
    }

    fn abandon(&self, story_id: &str, error: &AuditError) {
        if error.is_recoverable() {
            tracing::warn!(story = story_id, %error, "audit not started");
        } else {
            tracing::error!(story = story_id, %error, "audit abandoned");
        }
    }
}

impl<Y> std::fmt::Debug for StoryAuditor<Y> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryAuditor")
            .field("config", &self.config)
            .field("skip", &self.skip)
            .field("emitter", &self.emitter)
            .finish_non_exhaustive()
    }
}
