//! Flat fake document: selectors map to elements with a parent chain

use accesslint_core::{is_piercing, Document, ElementRef, SelectorError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Document construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("element {selector} names parent {parent}, which is not declared before it")]
    UnknownParent { selector: String, parent: String },
}

#[derive(Debug, Default)]
pub struct FakeDocument {
    by_selector: HashMap<String, ElementRef>,
    parents: HashMap<ElementRef, ElementRef>,
    next_id: u64,
    queries: AtomicUsize,
}

impl FakeDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element; `parent` must already exist
    ///
    /// # Panics
    /// If `parent` names an unknown selector
    #[must_use]
    pub fn with_element(mut self, selector: &str, parent: Option<&str>) -> Self {
        if let Err(e) = self.insert(selector, parent) {
            panic!("{e}");
        }
        self
    }

    /// Add an element under `parent`
    ///
    /// # Errors
    /// `DocumentError::UnknownParent` if `parent` was never added; the
    /// document is left unchanged
    pub fn insert(
        &mut self,
        selector: &str,
        parent: Option<&str>,
    ) -> Result<ElementRef, DocumentError> {
        let parent_ref = match parent {
            Some(parent) => Some(self.by_selector.get(parent).copied().ok_or_else(|| {
                DocumentError::UnknownParent {
                    selector: selector.to_string(),
                    parent: parent.to_string(),
                }
            })?),
            None => None,
        };
        let id = ElementRef(self.next_id);
        self.next_id += 1;
        if let Some(parent_ref) = parent_ref {
            self.parents.insert(id, parent_ref);
        }
        self.by_selector.insert(selector.to_string(), id);
        Ok(id)
    }

    /// # Panics
    /// If `selector` was never added
    pub fn element(&self, selector: &str) -> ElementRef {
        *self
            .by_selector
            .get(selector)
            .unwrap_or_else(|| panic!("unknown element {selector}"))
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    fn validate(selector: &str) -> Result<(), SelectorError> {
        let balanced = |open: char, close: char| {
            selector.chars().filter(|c| *c == open).count()
                == selector.chars().filter(|c| *c == close).count()
        };
        if selector.trim().is_empty()
            || is_piercing(selector)
            || !balanced('[', ']')
            || !balanced('(', ')')
        {
            return Err(SelectorError::Invalid(selector.to_string()));
        }
        Ok(())
    }
}

impl Document for FakeDocument {
    fn query_selector(&self, selector: &str) -> Result<Option<ElementRef>, SelectorError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        Self::validate(selector)?;
        Ok(self.by_selector.get(selector).copied())
    }

    fn contains(&self, ancestor: ElementRef, node: ElementRef) -> bool {
        let mut current = Some(node);
        while let Some(el) = current {
            if el == ancestor {
                return true;
            }
            current = self.parents.get(&el).copied();
        }
        false
    }
}
