//! Incremental audit scheduler
//!
//! Drives a [`ChunkedAudit`] one bounded slice at a time on the thread it
//! shares with rendering and test execution. Between slices control goes back
//! to the task queue through a zero-delay yield, so pending renders and timers
//! get a turn even under heavy audit load. The budget bounds a single slice,
//! not the whole audit.

use accesslint_core::{AuditResult, ChunkedAudit, EngineError, RawViolation};
use std::time::{Duration, Instant};

/// Zero-delay suspension point
#[async_trait::async_trait]
pub trait Yielder: Send + Sync {
    /// Return control to the host task queue once
    async fn yield_now(&self);
}

/// Yields to the tokio scheduler
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskYield;

#[async_trait::async_trait]
impl Yielder for TaskYield {
    async fn yield_now(&self) {
        tokio::task::yield_now().await;
    }
}

/// Outcome of one chunked run
#[derive(Debug, Clone)]
pub struct ChunkedRun {
    /// Accumulated result, read once after the last slice
    pub result: AuditResult<RawViolation>,
    /// Slices processed
    pub slices: usize,
    /// Times control was yielded
    pub yields: usize,
    /// Wall-clock time from first slice to final read
    pub elapsed: Duration,
}

/// Time-sliced cooperative scheduler
#[derive(Debug, Clone)]
pub struct AuditScheduler<Y = TaskYield> {
    budget: Duration,
    yielder: Y,
}

impl AuditScheduler<TaskYield> {
    /// Scheduler yielding to tokio with the given per-slice budget
    #[inline]
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self::with_yielder(budget, TaskYield)
    }
}

impl<Y: Yielder> AuditScheduler<Y> {
    /// Scheduler with a custom suspension point
    #[inline]
    #[must_use]
    pub fn with_yielder(budget: Duration, yielder: Y) -> Self {
        Self {
            budget: budget.max(Duration::from_millis(1)),
            yielder,
        }
    }

    /// Per-slice budget
    #[inline]
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Run `audit` to completion
    ///
    /// An audit needing N slices yields N-1 times and reads results once.
    ///
    /// # Errors
    /// Any `EngineError` from a slice or the final read; the run stops there
    pub async fn run(&self, audit: &mut (dyn ChunkedAudit + '_)) -> Result<ChunkedRun, EngineError> {
        let started = Instant::now();
        let mut slices = 0;
        let mut yields = 0;

        loop {
            let more = audit.process_chunk(self.budget)?;
            slices += 1;
            if !more {
                break;
            }
            self.yielder.yield_now().await;
            yields += 1;
        }

        let result = audit.results()?;
        let elapsed = started.elapsed();
        tracing::debug!(slices, yields, ?elapsed, "chunked audit complete");

        Ok(ChunkedRun {
            result,
            slices,
            yields,
            elapsed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accesslint_core::Impact;
    use accesslint_test_utils::{violation, EngineCounters, FakeDocument, ScriptedEngine};
    use accesslint_core::RuleEngine;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Default, Clone)]
    struct CountingYield(Arc<AtomicUsize>);

    #[async_trait::async_trait]
    impl Yielder for CountingYield {
        async fn yield_now(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn yields_between_slices_only() {
        for slices in [1usize, 2, 5] {
            let engine = ScriptedEngine::new([]).with_slices(slices);
            let doc = FakeDocument::new();
            let counter = CountingYield::default();
            let scheduler = AuditScheduler::with_yielder(Duration::from_millis(12), counter.clone());

            let mut audit = engine.start_chunked(&doc).unwrap();
            let run = scheduler.run(audit.as_mut()).await.unwrap();

            assert_eq!(run.slices, slices);
            assert_eq!(run.yields, slices - 1);
            assert_eq!(counter.0.load(Ordering::SeqCst), slices - 1);

            let counters = engine.counters();
            assert_eq!(EngineCounters::get(&counters.chunks), slices);
            assert_eq!(EngineCounters::get(&counters.results_reads), 1);
        }
    }

    #[tokio::test]
    async fn results_read_after_final_slice() {
        let engine = ScriptedEngine::new([])
            .with_violations(vec![violation("region", "#main", Impact::Moderate)])
            .with_slices(3);
        let doc = FakeDocument::new();
        let mut audit = engine.start_chunked(&doc).unwrap();

        let run = AuditScheduler::new(Duration::from_millis(12))
            .run(audit.as_mut())
            .await
            .unwrap();

        assert_eq!(run.result.violations.len(), 1);
    }

    #[tokio::test]
    async fn slice_failure_stops_run() {
        let engine = ScriptedEngine::new([]).with_slices(4).failing_at_slice(2);
        let doc = FakeDocument::new();
        let mut audit = engine.start_chunked(&doc).unwrap();

        let err = AuditScheduler::new(Duration::from_millis(12))
            .run(audit.as_mut())
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::ExecutionFailed(_)));
        let counters = engine.counters();
        assert_eq!(EngineCounters::get(&counters.chunks), 2);
        assert_eq!(EngineCounters::get(&counters.results_reads), 0);
    }

    #[tokio::test]
    async fn other_tasks_run_between_slices() {
        let engine = ScriptedEngine::new([]).with_slices(3);
        let doc = FakeDocument::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = {
            let ticks = Arc::clone(&ticks);
            tokio::spawn(async move {
                loop {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut audit = engine.start_chunked(&doc).unwrap();
        AuditScheduler::new(Duration::from_millis(12))
            .run(audit.as_mut())
            .await
            .unwrap();

        assert!(ticks.load(Ordering::SeqCst) >= 1);
        ticker.abort();
    }
}
