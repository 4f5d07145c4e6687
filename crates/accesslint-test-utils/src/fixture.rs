//! JSON session fixtures: rules, a document tree, and stories to audit
//!
//! ```json
//! {
//!   "rules": [{ "id": "image-alt", "level": "A", "wcag": ["1.1.1"] }],
//!   "elements": [{ "selector": "#root" }, { "selector": "img", "parent": "#root" }],
//!   "stories": [
//!     { "id": "card--default", "root": "#root", "violations": [ ... ] },
//!     { "id": "card--wip", "tags": ["no-a11y"] }
//!   ]
//! }
//! ```

use crate::document::DocumentError;
use crate::{FakeDocument, ScriptedEngine};
use accesslint_core::{RuleMetadata, Violation};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ElementFixture {
    pub selector: String,
    #[serde(default)]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoryFixture {
    pub id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Selector of the story's root container
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub violations: Vec<Violation>,
    /// Slices the chunked audit needs for this story
    #[serde(default = "default_slices")]
    pub slices: usize,
}

fn default_slices() -> usize {
    1
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFixture {
    #[serde(default)]
    pub rules: Vec<RuleMetadata>,
    /// Overrides the rule count, which defaults to the number of rules
    #[serde(default)]
    pub rule_count: Option<u32>,
    #[serde(default)]
    pub elements: Vec<ElementFixture>,
    #[serde(default)]
    pub stories: Vec<StoryFixture>,
}

impl SessionFixture {
    /// # Errors
    /// If `json` is not a valid fixture
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Elements are added in order, so parents must precede children
    ///
    /// # Errors
    /// `DocumentError::UnknownParent` if an element names a parent that was
    /// not declared before it
    pub fn document(&self) -> Result<FakeDocument, DocumentError> {
        let mut doc = FakeDocument::new();
        for el in &self.elements {
            doc.insert(&el.selector, el.parent.as_deref())?;
        }
        Ok(doc)
    }

    pub fn engine(&self) -> ScriptedEngine {
        let engine = ScriptedEngine::new(self.rules.iter().cloned());
        match self.rule_count {
            Some(count) => engine.with_rule_count(count),
            None => engine,
        }
    }
}
