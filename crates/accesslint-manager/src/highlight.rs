//! Highlight overlay synchronizer
//!
//! Owns the single active highlight. Every activation first removes what is
//! there, so two overlays never coexist.

use accesslint_core::{
    local_selector, HighlightRemoval, HighlightRequest, HighlightStyle, Message, MessageBus,
    ProtocolError,
};
use std::sync::Arc;

/// Overlay id reused by every request
pub const HIGHLIGHT_ID: &str = "accesslint/a11y/highlight";

/// Style applied when the caller passes none
#[must_use]
pub fn default_style() -> HighlightStyle {
    [
        ("outline", "2px solid #d93025"),
        ("outlineOffset", "2px"),
        ("backgroundColor", "rgba(217, 48, 37, 0.12)"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Sends highlight add/remove messages for one overlay
#[derive(Debug)]
pub struct HighlightSync {
    bus: Arc<dyn MessageBus>,
    id: String,
    active: Option<HighlightRequest>,
}

impl HighlightSync {
    /// Synchronizer publishing on `bus`
    #[must_use]
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self {
            bus,
            id: HIGHLIGHT_ID.to_string(),
            active: None,
        }
    }

    /// Currently active request
    #[inline]
    #[must_use]
    pub fn active(&self) -> Option<&HighlightRequest> {
        self.active.as_ref()
    }

    /// Highlight the element behind `selector`, replacing any current one
    ///
    /// The local selector is re-derived here, right before sending. An empty
    /// result behaves like [`Self::deactivate`].
    ///
    /// # Errors
    /// `ProtocolError` if a message cannot be encoded
    pub fn activate(
        &mut self,
        selector: &str,
        style: Option<HighlightStyle>,
    ) -> Result<(), ProtocolError> {
        self.deactivate()?;
        let local = local_selector(selector);
        if local.is_empty() {
            return Ok(());
        }
        let request = HighlightRequest {
            id: self.id.clone(),
            selectors: vec![local.to_string()],
            style: style.unwrap_or_else(default_style),
        };
        self.bus.send(&Message::HighlightAdd(request.clone()))?;
        tracing::debug!(selector = local, "highlight active");
        self.active = Some(request);
        Ok(())
    }

    /// Remove the highlight; always sends, even when nothing is active
    ///
    /// # Errors
    /// `ProtocolError` if the message cannot be encoded
    pub fn deactivate(&mut self) -> Result<(), ProtocolError> {
        self.active = None;
        self.bus.send(&Message::HighlightRemove(HighlightRemoval {
            id: self.id.clone(),
        }))
    }
}
