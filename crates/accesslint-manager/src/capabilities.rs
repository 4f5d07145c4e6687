//! Optional host capabilities
//!
//! Older hosts have neither a status store nor a test-provider store. The
//! manager asks once, at construction, and falls back to panel-only mode
//! unless both exist. Navigation (selecting a story, opening the panel) is
//! a separate optional [`PanelHost`].

use crate::provider::TestProviderState;
use crate::status::StatusRecord;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Host store behind the sidebar status dots
pub trait StatusStore: Send + Sync {
    /// Insert or replace records, keyed by story id
    fn set(&self, records: Vec<StatusRecord>);

    /// Remove every record of this addon's type
    fn unset(&self);
}

/// Host store for the global test-provider state
pub trait TestProviderStore: Send + Sync {
    /// Current state
    fn state(&self) -> TestProviderState;

    /// Replace the state
    fn set_state(&self, state: TestProviderState);
}

/// Host navigation the panel side can trigger
pub trait PanelHost: Send + Sync {
    /// Navigate to a story
    fn select_story(&self, story_id: &str);

    /// Make `panel_id` the active addon panel
    fn select_panel(&self, panel_id: &str);

    /// Show or hide the addon panel area
    fn toggle_panel(&self, open: bool);
}

/// One call made on a [`PanelHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    /// `select_story`
    SelectStory(String),
    /// `select_panel`
    SelectPanel(String),
    /// `toggle_panel`
    TogglePanel(bool),
}

/// Panel host that records every call
#[derive(Debug, Default)]
pub struct MemoryPanelHost {
    actions: Mutex<Vec<HostAction>>,
}

impl MemoryPanelHost {
    /// Host with no calls recorded
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls so far, oldest first
    #[must_use]
    pub fn actions(&self) -> Vec<HostAction> {
        self.actions.lock().clone()
    }
}

impl PanelHost for MemoryPanelHost {
    fn select_story(&self, story_id: &str) {
        self.actions
            .lock()
            .push(HostAction::SelectStory(story_id.to_string()));
    }

    fn select_panel(&self, panel_id: &str) {
        self.actions
            .lock()
            .push(HostAction::SelectPanel(panel_id.to_string()));
    }

    fn toggle_panel(&self, open: bool) {
        self.actions.lock().push(HostAction::TogglePanel(open));
    }
}

/// In-memory status store
#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    records: DashMap<String, StatusRecord>,
}

impl MemoryStatusStore {
    /// Empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `story_id`
    #[must_use]
    pub fn get(&self, story_id: &str) -> Option<StatusRecord> {
        self.records.get(story_id).map(|r| r.value().clone())
    }

    /// Number of stories with a status
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no story has a status
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl StatusStore for MemoryStatusStore {
    fn set(&self, records: Vec<StatusRecord>) {
        for record in records {
            self.records.insert(record.story_id.clone(), record);
        }
    }

    fn unset(&self) {
        self.records.clear();
    }
}

/// In-memory test-provider store
#[derive(Debug, Default)]
pub struct MemoryTestProvider {
    state: Mutex<TestProviderState>,
}

impl MemoryTestProvider {
    /// Provider in `idle`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TestProviderStore for MemoryTestProvider {
    fn state(&self) -> TestProviderState {
        *self.state.lock()
    }

    fn set_state(&self, state: TestProviderState) {
        *self.state.lock() = state;
    }
}

/// What the host offers
#[derive(Clone, Default)]
pub struct HostCapabilities {
    /// Sidebar status store, if the host has one
    pub status_store: Option<Arc<dyn StatusStore>>,
    /// Test-provider store, if the host has one
    pub test_provider: Option<Arc<dyn TestProviderStore>>,
    /// Navigation, if the host exposes it
    pub panel_host: Option<Arc<dyn PanelHost>>,
}

impl HostCapabilities {
    /// Host with neither store
    #[inline]
    #[must_use]
    pub fn panel_only() -> Self {
        Self::default()
    }

    /// With a status store
    #[inline]
    #[must_use]
    pub fn with_status_store(mut self, store: Arc<dyn StatusStore>) -> Self {
        self.status_store = Some(store);
        self
    }

    /// With a test-provider store
    #[inline]
    #[must_use]
    pub fn with_test_provider(mut self, store: Arc<dyn TestProviderStore>) -> Self {
        self.test_provider = Some(store);
        self
    }

    /// With host navigation
    #[inline]
    #[must_use]
    pub fn with_panel_host(mut self, host: Arc<dyn PanelHost>) -> Self {
        self.panel_host = Some(host);
        self
    }

    /// Both stores, when the host has both
    #[must_use]
    pub fn test_provider_feature(
        &self,
    ) -> Option<(Arc<dyn StatusStore>, Arc<dyn TestProviderStore>)> {
        match (&self.status_store, &self.test_provider) {
            (Some(status), Some(provider)) => Some((Arc::clone(status), Arc::clone(provider))),
            _ => None,
        }
    }
}

impl std::fmt::Debug for HostCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostCapabilities")
            .field("status_store", &self.status_store.is_some())
            .field("test_provider", &self.test_provider.is_some())
            .field("panel_host", &self.panel_host.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusValue;
    use accesslint_core::{ReportOutcome, ReportStatus, SkippedAudit};

    #[test]
    fn feature_requires_both_stores() {
        let status: Arc<dyn StatusStore> = Arc::new(MemoryStatusStore::new());
        let provider: Arc<dyn TestProviderStore> = Arc::new(MemoryTestProvider::new());

        assert!(HostCapabilities::panel_only().test_provider_feature().is_none());
        assert!(HostCapabilities::panel_only()
            .with_status_store(status.clone())
            .test_provider_feature()
            .is_none());
        assert!(HostCapabilities::panel_only()
            .with_status_store(status)
            .with_test_provider(provider)
            .test_provider_feature()
            .is_some());
    }

    #[test]
    fn panel_host_records_calls_in_order() {
        let host = MemoryPanelHost::new();
        host.select_story("card--default");
        host.select_panel("accesslint/a11y/panel");
        host.toggle_panel(true);

        assert_eq!(
            host.actions(),
            vec![
                HostAction::SelectStory("card--default".into()),
                HostAction::SelectPanel("accesslint/a11y/panel".into()),
                HostAction::TogglePanel(true),
            ]
        );
    }

    #[test]
    fn status_store_is_last_write_wins() {
        let store = MemoryStatusStore::new();
        let skipped = ReportOutcome::Skipped(SkippedAudit::new("wip"));
        store.set(vec![StatusRecord::from_report("a", &skipped, None)]);
        store.set(vec![StatusRecord::from_report(
            "a",
            &ReportOutcome::Audited(accesslint_core::AuditResult::clean(3)),
            Some(ReportStatus::Passed),
        )]);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").unwrap().value, StatusValue::Success);
        store.unset();
        assert!(store.is_empty());
    }
}
