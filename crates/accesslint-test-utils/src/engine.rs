//! Scripted rule engine with call counters

use accesslint_core::{
    AuditResult, ChunkedAudit, Document, EngineError, ElementRef, RawViolation, RuleCatalog,
    RuleEngine, RuleMetadata, Violation,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How many times each engine entry point ran
#[derive(Debug, Default)]
pub struct EngineCounters {
    pub single_shot: AtomicUsize,
    pub chunked_started: AtomicUsize,
    pub chunks: AtomicUsize,
    pub results_reads: AtomicUsize,
    pub lookups: AtomicUsize,
    pub configures: AtomicUsize,
}

impl EngineCounters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::Relaxed)
    }

    /// Total audits started, either mode
    pub fn audits(&self) -> usize {
        Self::get(&self.single_shot) + Self::get(&self.chunked_started)
    }
}

#[derive(Debug, Default)]
struct Script {
    violations: Vec<Violation>,
    slices: usize,
    fail_at_slice: Option<usize>,
}

/// Engine that returns a preloaded violation list
///
/// Disabled rules are filtered out the way a real engine would, after
/// `configure`.
#[derive(Debug)]
pub struct ScriptedEngine {
    rules: BTreeMap<String, RuleMetadata>,
    rule_count: u32,
    script: Mutex<Script>,
    disabled: Mutex<BTreeSet<String>>,
    counters: Arc<EngineCounters>,
}

impl ScriptedEngine {
    pub fn new(rules: impl IntoIterator<Item = RuleMetadata>) -> Self {
        let rules: BTreeMap<_, _> = rules.into_iter().map(|r| (r.id.clone(), r)).collect();
        let rule_count = u32::try_from(rules.len()).unwrap_or(u32::MAX);
        Self {
            rules,
            rule_count,
            script: Mutex::new(Script {
                slices: 1,
                ..Script::default()
            }),
            disabled: Mutex::new(BTreeSet::new()),
            counters: Arc::new(EngineCounters::default()),
        }
    }

    #[must_use]
    pub fn with_rule_count(mut self, rule_count: u32) -> Self {
        self.rule_count = rule_count;
        self
    }

    #[must_use]
    pub fn with_violations(self, violations: Vec<Violation>) -> Self {
        self.load(violations);
        self
    }

    #[must_use]
    pub fn with_slices(self, slices: usize) -> Self {
        self.script.lock().slices = slices.max(1);
        self
    }

    /// Fail while processing slice `slice` (1-based)
    #[must_use]
    pub fn failing_at_slice(self, slice: usize) -> Self {
        self.script.lock().fail_at_slice = Some(slice);
        self
    }

    /// Replace the violations the next audit reports
    pub fn load(&self, violations: Vec<Violation>) {
        self.script.lock().violations = violations;
    }

    pub fn set_slices(&self, slices: usize) {
        self.script.lock().slices = slices.max(1);
    }

    pub fn counters(&self) -> Arc<EngineCounters> {
        Arc::clone(&self.counters)
    }

    pub fn disabled(&self) -> BTreeSet<String> {
        self.disabled.lock().clone()
    }

    fn snapshot(&self) -> AuditResult<RawViolation> {
        let disabled = self.disabled.lock();
        let violations = self
            .script
            .lock()
            .violations
            .iter()
            .filter(|v| !disabled.contains(&v.rule_id))
            .enumerate()
            .map(|(i, v)| RawViolation::new(v.clone()).with_element(ElementRef(i as u64)))
            .collect();
        let active = self.rule_count.saturating_sub(
            u32::try_from(disabled.iter().filter(|d| self.rules.contains_key(*d)).count())
                .unwrap_or(0),
        );
        AuditResult::new(violations, active)
    }
}

impl RuleCatalog for ScriptedEngine {
    fn rule(&self, rule_id: &str) -> Option<RuleMetadata> {
        self.counters.lookups.fetch_add(1, Ordering::Relaxed);
        self.rules.get(rule_id).cloned()
    }
}

impl RuleEngine for ScriptedEngine {
    fn configure(&self, disabled_rules: &BTreeSet<String>) {
        self.counters.configures.fetch_add(1, Ordering::Relaxed);
        *self.disabled.lock() = disabled_rules.clone();
    }

    fn run_audit(&self, _document: &dyn Document) -> Result<AuditResult<RawViolation>, EngineError> {
        self.counters.single_shot.fetch_add(1, Ordering::Relaxed);
        if self.script.lock().fail_at_slice.is_some() {
            return Err(EngineError::ExecutionFailed("scripted failure".into()));
        }
        Ok(self.snapshot())
    }

    fn start_chunked<'a>(
        &'a self,
        _document: &'a dyn Document,
    ) -> Result<Box<dyn ChunkedAudit + 'a>, EngineError> {
        self.counters.chunked_started.fetch_add(1, Ordering::Relaxed);
        let script = self.script.lock();
        Ok(Box::new(ScriptedAudit {
            engine: self,
            total: script.slices,
            done: 0,
            fail_at: script.fail_at_slice,
        }))
    }
}

struct ScriptedAudit<'a> {
    engine: &'a ScriptedEngine,
    total: usize,
    done: usize,
    fail_at: Option<usize>,
}

impl ChunkedAudit for ScriptedAudit<'_> {
    fn process_chunk(&mut self, _budget: Duration) -> Result<bool, EngineError> {
        self.engine.counters.chunks.fetch_add(1, Ordering::Relaxed);
        self.done += 1;
        if self.fail_at == Some(self.done) {
            return Err(EngineError::ExecutionFailed(format!(
                "rule threw in slice {}",
                self.done
            )));
        }
        Ok(self.done < self.total)
    }

    fn results(&mut self) -> Result<AuditResult<RawViolation>, EngineError> {
        self.engine
            .counters
            .results_reads
            .fetch_add(1, Ordering::Relaxed);
        if self.done < self.total {
            return Err(EngineError::Incomplete);
        }
        Ok(self.engine.snapshot())
    }
}
