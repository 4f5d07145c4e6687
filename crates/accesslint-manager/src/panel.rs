//! Panel presentation model
//!
//! Derived from the latest violation list only:
//! - Stable sort by impact rank (`critical = serious < moderate < minor`)
//! - At most one expanded row
//! - Keyboard focus moving over `[0, len - 1]`
//!
//! [`PanelController`] adds the highlight overlay on top of the model.

use crate::highlight::HighlightSync;
use accesslint_core::{EnrichedViolation, ProtocolError, ReportOutcome};

/// Sort by impact rank, keeping input order within a rank
#[must_use]
pub fn sort_by_impact(mut violations: Vec<EnrichedViolation>) -> Vec<EnrichedViolation> {
    violations.sort_by_key(|v| v.impact().rank());
    violations
}

/// Sorted list with expansion and focus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelModel {
    items: Vec<EnrichedViolation>,
    expanded: Option<usize>,
    focused: Option<usize>,
}

impl PanelModel {
    /// Empty panel
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list; expansion and focus reset
    pub fn set_violations(&mut self, violations: Vec<EnrichedViolation>) {
        self.items = sort_by_impact(violations);
        self.expanded = None;
        self.focused = None;
    }

    /// Sorted rows
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[EnrichedViolation] {
        &self.items
    }

    /// Row count
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Expanded row index
    #[inline]
    #[must_use]
    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    /// Expanded row
    #[must_use]
    pub fn expanded_item(&self) -> Option<&EnrichedViolation> {
        self.expanded.and_then(|i| self.items.get(i))
    }

    /// Open `index` (closing any other) or close it if already open
    ///
    /// Out-of-range indices are ignored. Returns the expanded row after the
    /// toggle.
    pub fn toggle(&mut self, index: usize) -> Option<usize> {
        if index >= self.items.len() {
            return self.expanded;
        }
        self.expanded = if self.expanded == Some(index) {
            None
        } else {
            Some(index)
        };
        self.expanded
    }

    /// Close the expanded row
    pub fn collapse(&mut self) {
        self.expanded = None;
    }

    /// Focused row index
    #[inline]
    #[must_use]
    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Move focus down, stopping at the last row
    pub fn focus_next(&mut self) -> Option<usize> {
        let last = self.items.len().checked_sub(1)?;
        self.focused = Some(self.focused.map_or(0, |i| (i + 1).min(last)));
        self.focused
    }

    /// Move focus up, stopping at the first row
    pub fn focus_prev(&mut self) -> Option<usize> {
        let last = self.items.len().checked_sub(1)?;
        self.focused = Some(self.focused.map_or(last, |i| i.saturating_sub(1)));
        self.focused
    }

    /// Focus the first row
    pub fn focus_first(&mut self) -> Option<usize> {
        self.focused = (!self.items.is_empty()).then_some(0);
        self.focused
    }

    /// Focus the last row
    pub fn focus_last(&mut self) -> Option<usize> {
        self.focused = self.items.len().checked_sub(1);
        self.focused
    }
}

/// Panel model coupled with the highlight overlay
#[derive(Debug)]
pub struct PanelController {
    model: PanelModel,
    highlight: HighlightSync,
}

impl PanelController {
    /// Controller driving `highlight`
    #[must_use]
    pub fn new(highlight: HighlightSync) -> Self {
        Self {
            model: PanelModel::new(),
            highlight,
        }
    }

    /// Presentation state
    #[inline]
    #[must_use]
    pub fn model(&self) -> &PanelModel {
        &self.model
    }

    /// Highlight state
    #[inline]
    #[must_use]
    pub fn highlight(&self) -> &HighlightSync {
        &self.highlight
    }

    /// Show a new result; the old highlight goes first
    ///
    /// # Errors
    /// `ProtocolError` if the removal cannot be encoded
    pub fn show(&mut self, outcome: &ReportOutcome) -> Result<(), ProtocolError> {
        self.highlight.deactivate()?;
        self.model.set_violations(outcome.violations().to_vec());
        Ok(())
    }

    /// Toggle a row, highlighting it when it opens
    ///
    /// # Errors
    /// `ProtocolError` if a highlight message cannot be encoded
    pub fn toggle(&mut self, index: usize) -> Result<(), ProtocolError> {
        let before = self.model.expanded();
        let after = self.model.toggle(index);
        if before == after {
            return Ok(());
        }
        match self.model.expanded_item() {
            Some(item) => {
                let selector = item.selector().to_string();
                self.highlight.activate(&selector, None)
            }
            None => self.highlight.deactivate(),
        }
    }

    /// Toggle the focused row
    ///
    /// # Errors
    /// `ProtocolError` if a highlight message cannot be encoded
    pub fn toggle_focused(&mut self) -> Result<(), ProtocolError> {
        match self.model.focused() {
            Some(index) => self.toggle(index),
            None => Ok(()),
        }
    }

    /// Keyboard focus down
    pub fn focus_next(&mut self) -> Option<usize> {
        self.model.focus_next()
    }

    /// Keyboard focus up
    pub fn focus_prev(&mut self) -> Option<usize> {
        self.model.focus_prev()
    }

    /// Keyboard focus to the first row
    pub fn focus_first(&mut self) -> Option<usize> {
        self.model.focus_first()
    }

    /// Keyboard focus to the last row
    pub fn focus_last(&mut self) -> Option<usize> {
        self.model.focus_last()
    }
}
