//! AccessLint Manager
//!
//! Consumers of the reporting protocol on the panel side:
//! - **Status**: per-story sidebar records, mapped purely from each report
//! - **Provider**: the `idle → running → succeeded` test-provider lifecycle
//! - **Highlight**: the single active overlay in the rendering context
//! - **Panel**: sorted, expandable, keyboard-navigable violation list
//! - **Widget**: count, indicator, and labels for the provider widget
//! - **Navigation**: status-dot clicks and the sidebar "View AccessLint
//!   results" action open the panel
//!
//! [`Manager`] wires them to one channel subscription.

#![warn(unreachable_pub)]

pub mod capabilities;
pub mod error;
pub mod highlight;
pub mod manager;
pub mod panel;
pub mod provider;
pub mod status;
pub mod widget;

pub use capabilities::{
    HostAction, HostCapabilities, MemoryPanelHost, MemoryStatusStore, MemoryTestProvider,
    PanelHost, StatusStore, TestProviderStore,
};
pub use error::ManagerError;
pub use highlight::{default_style, HighlightSync, HIGHLIGHT_ID};
pub use manager::Manager;
pub use panel::{sort_by_impact, PanelController, PanelModel};
pub use provider::{allowed_transitions, validate_transition, TestProviderState};
pub use status::{
    pluralize_violations, status_description, status_value, StatusRecord, StatusValue,
    STATUS_TITLE,
};
pub use widget::{Indicator, WidgetSummary};
