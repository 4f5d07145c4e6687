//! Panel-side dispatcher
//!
//! Reads envelopes from the channel and fans each `result` out to every
//! surface: the panel, the widget summary, the sidebar status store, and
//! the test-provider lifecycle. Anything it cannot read is logged and
//! skipped; the channel is shared with other addons.

use crate::capabilities::{HostCapabilities, PanelHost, StatusStore, TestProviderStore};
use crate::error::ManagerError;
use crate::highlight::HighlightSync;
use crate::panel::PanelController;
use crate::provider::{validate_transition, TestProviderState};
use crate::status::StatusRecord;
use crate::widget::WidgetSummary;
use accesslint_core::{
    AuditMeta, Envelope, Message, MessageBus, ResultPayload, Subscription, PANEL_ID,
    TEST_PROVIDER_ID,
};
use std::sync::Arc;

/// Consumer of the reporting protocol
pub struct Manager {
    status_store: Option<Arc<dyn StatusStore>>,
    test_provider: Option<Arc<dyn TestProviderStore>>,
    panel_host: Option<Arc<dyn PanelHost>>,
    panel: PanelController,
    summary: WidgetSummary,
    last_meta: Option<AuditMeta>,
    ignored: usize,
}

impl Manager {
    /// Manager publishing highlights on `bus`
    ///
    /// Capabilities are read once here; the test-provider feature is on only
    /// when the host has both stores.
    #[must_use]
    pub fn new(bus: Arc<dyn MessageBus>, capabilities: &HostCapabilities) -> Self {
        let (status_store, test_provider) = match capabilities.test_provider_feature() {
            Some((status, provider)) => {
                tracing::info!(provider = TEST_PROVIDER_ID, "test provider registered");
                (Some(status), Some(provider))
            }
            None => {
                tracing::info!("host lacks status or test-provider store; panel only");
                (None, None)
            }
        };
        Self {
            status_store,
            test_provider,
            panel_host: capabilities.panel_host.clone(),
            panel: PanelController::new(HighlightSync::new(bus)),
            summary: WidgetSummary::new(),
            last_meta: None,
            ignored: 0,
        }
    }

    /// Whether the test-provider feature is registered
    #[inline]
    #[must_use]
    pub fn has_test_provider(&self) -> bool {
        self.test_provider.is_some()
    }

    /// Panel state
    #[inline]
    #[must_use]
    pub fn panel(&self) -> &PanelController {
        &self.panel
    }

    /// Panel state, for user interaction
    #[inline]
    pub fn panel_mut(&mut self) -> &mut PanelController {
        &mut self.panel
    }

    /// Widget and title summary
    #[inline]
    #[must_use]
    pub fn summary(&self) -> &WidgetSummary {
        &self.summary
    }

    /// Latest aggregate summary
    #[inline]
    #[must_use]
    pub fn last_meta(&self) -> Option<AuditMeta> {
        self.last_meta
    }

    /// Envelopes skipped so far
    #[inline]
    #[must_use]
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// Test-provider state, when the feature is on
    #[must_use]
    pub fn provider_state(&self) -> Option<TestProviderState> {
        self.test_provider.as_ref().map(|p| p.state())
    }

    /// Handle one envelope, logging and skipping what cannot be used
    pub fn dispatch(&mut self, envelope: &Envelope) {
        if let Err(e) = self.handle(envelope) {
            self.ignored += 1;
            match &e {
                ManagerError::Protocol(p) if p.is_foreign() => {
                    tracing::trace!(event = %envelope.event, "not ours");
                }
                e if e.is_ignorable() => {
                    tracing::warn!(event = %envelope.event, error = %e, "message ignored");
                }
                e => tracing::error!(event = %envelope.event, error = %e, "message rejected"),
            }
        }
    }

    /// Handle one envelope
    ///
    /// # Errors
    /// - `ManagerError::Protocol` for unknown events or malformed payloads
    /// - `ManagerError::IllegalTransition` if the provider store holds a
    ///   state the lifecycle cannot leave
    pub fn handle(&mut self, envelope: &Envelope) -> Result<(), ManagerError> {
        match Message::decode(envelope)? {
            Message::Result(payload) => self.on_result(&payload),
            Message::Meta(meta) => {
                self.last_meta = Some(meta);
                Ok(())
            }
            // Our own overlay traffic echoed back
            Message::HighlightAdd(_) | Message::HighlightRemove(_) => Ok(()),
        }
    }

    /// Drain a subscription until the bus closes
    pub async fn run(&mut self, mut subscription: Subscription) {
        while let Some(envelope) = subscription.recv().await {
            self.dispatch(&envelope);
        }
        tracing::debug!("channel closed");
    }

    /// Handle everything already queued on `subscription`
    pub fn pump(&mut self, subscription: &mut Subscription) -> usize {
        let envelopes = subscription.drain();
        for envelope in &envelopes {
            self.dispatch(envelope);
        }
        envelopes.len()
    }

    /// Bring the AccessLint panel to the front
    ///
    /// Returns whether the host could be asked to.
    pub fn open_panel(&self) -> bool {
        let Some(host) = &self.panel_host else {
            tracing::debug!("host has no panel navigation");
            return false;
        };
        host.select_panel(PANEL_ID);
        host.toggle_panel(true);
        true
    }

    /// A sidebar status dot of ours was clicked
    ///
    /// Only status-store hosts have dots; without one this is a no-op.
    pub fn status_selected(&self) -> bool {
        if self.status_store.is_none() {
            return false;
        }
        self.open_panel()
    }

    /// Sidebar context-menu "View AccessLint results" for `story_id`
    pub fn view_results(&self, story_id: &str) -> bool {
        let Some(host) = &self.panel_host else {
            tracing::debug!(story = story_id, "host has no panel navigation");
            return false;
        };
        host.select_story(story_id);
        self.open_panel()
    }

    /// Host "clear all": unset every status, leave the provider alone
    pub fn clear_all(&self) {
        if let Some(store) = &self.status_store {
            store.unset();
            tracing::debug!("statuses cleared");
        }
    }

    /// Move the provider to `running` on behalf of the external test driver
    ///
    /// # Errors
    /// `ManagerError::IllegalTransition` if a run is already in progress
    pub fn begin_run(&self) -> Result<(), ManagerError> {
        let Some(provider) = &self.test_provider else {
            return Ok(());
        };
        let from = provider.state();
        validate_transition(from, TestProviderState::Running)?;
        provider.set_state(TestProviderState::Running);
        Ok(())
    }

    fn on_result(&mut self, payload: &ResultPayload) -> Result<(), ManagerError> {
        self.summary.record(&payload.result);
        self.panel.show(&payload.result)?;

        if let (Some(store), Some(story_id)) = (&self.status_store, &payload.story_id) {
            store.set(vec![StatusRecord::from_report(
                story_id.clone(),
                &payload.result,
                payload.status,
            )]);
        }

        if let Some(provider) = &self.test_provider {
            let from = provider.state();
            if from == TestProviderState::Running {
                validate_transition(from, TestProviderState::Succeeded)?;
                provider.set_state(TestProviderState::Succeeded);
                tracing::info!("test provider run succeeded");
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("test_provider", &self.has_test_provider())
            .field("panel_host", &self.panel_host.is_some())
            .field("summary", &self.summary)
            .field("ignored", &self.ignored)
            .finish_non_exhaustive()
    }
}
