//! In-flight and staleness tracking for audit runs
//!
//! Two rules, both per unit:
//! - at most one run per unit is in flight
//! - a run whose unit is switched away from before it finishes must not
//!   report
//!
//! Each unit carries its own generation. Beginning a run moves that unit's
//! generation on; selecting a unit (or tearing the selection down) moves the
//! generation of every other in-flight unit. Runs for different
//! units never invalidate each other.

use crate::error::AuditError;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use ulid::Ulid;

/// Unique audit run identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(pub Ulid);

impl RunId {
    /// Generate new run ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    generations: HashMap<String, u64>,
    selected: Option<String>,
    in_flight: HashSet<String>,
}

impl TrackerState {
    fn bump(&mut self, unit: &str) -> u64 {
        let generation = self.generations.entry(unit.to_string()).or_insert(0);
        *generation += 1;
        *generation
    }
}

/// Shared run bookkeeping
#[derive(Debug, Default)]
pub struct RunTracker {
    state: Mutex<TrackerState>,
}

impl RunTracker {
    /// Create tracker
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a run for `unit`
    ///
    /// # Errors
    /// `AuditError::AlreadyInFlight` if a run for `unit` has not finished
    pub fn begin(&self, unit: &str) -> Result<RunTicket<'_>, AuditError> {
        let mut state = self.state.lock();
        if !state.in_flight.insert(unit.to_string()) {
            return Err(AuditError::AlreadyInFlight {
                unit: unit.to_string(),
            });
        }
        let generation = state.bump(unit);
        let ticket = RunTicket {
            tracker: self,
            id: RunId::new(),
            unit: unit.to_string(),
            generation,
        };
        tracing::debug!(run = %ticket.id, unit, generation, "audit run started");
        Ok(ticket)
    }

    /// Record that the host switched to `unit` (or tore the current one down)
    ///
    /// Runs in flight for any other unit go stale; a run for `unit` itself
    /// stays current.
    pub fn select(&self, unit: Option<&str>) {
        let mut state = self.state.lock();
        let superseded: Vec<String> = state
            .in_flight
            .iter()
            .filter(|u| Some(u.as_str()) != unit)
            .cloned()
            .collect();
        for stale in &superseded {
            state.bump(stale);
        }
        state.selected = unit.map(str::to_string);
    }

    /// Whether a run for `unit` is in flight
    #[must_use]
    pub fn is_in_flight(&self, unit: &str) -> bool {
        self.state.lock().in_flight.contains(unit)
    }

    /// Currently selected unit
    #[must_use]
    pub fn current_unit(&self) -> Option<String> {
        self.state.lock().selected.clone()
    }

    fn is_current(&self, unit: &str, generation: u64) -> bool {
        self.state.lock().generations.get(unit) == Some(&generation)
    }

    fn release(&self, unit: &str) {
        self.state.lock().in_flight.remove(unit);
    }
}

/// Proof of an in-flight run; releases the unit when dropped
#[derive(Debug)]
pub struct RunTicket<'a> {
    tracker: &'a RunTracker,
    id: RunId,
    unit: String,
    generation: u64,
}

impl RunTicket<'_> {
    /// Run id
    #[inline]
    #[must_use]
    pub fn id(&self) -> RunId {
        self.id
    }

    /// Unit this run audits
    #[inline]
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Whether the run may still report
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.tracker.is_current(&self.unit, self.generation)
    }
}

impl Drop for RunTicket<'_> {
    fn drop(&mut self) {
        self.tracker.release(&self.unit);
    }
}
