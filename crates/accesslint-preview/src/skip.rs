//! Tag-based skip policy
//!
//! A story carrying any skip tag is never audited. The tag list is the fixed
//! default, plus tags injected at build time through `ACCESSLINT_SKIP_TAGS`
//! (a JSON array), plus the caller's configured tags.

use crate::config::AuditConfig;

/// Tag that always skips a story
pub const DEFAULT_SKIP_TAG: &str = "no-a11y";

/// Raw build-time skip tags, if any were injected
pub const BUILD_SKIP_TAGS: Option<&str> = option_env!("ACCESSLINT_SKIP_TAGS");

/// Resolved skip tags, in match priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipPolicy {
    tags: Vec<String>,
}

impl SkipPolicy {
    /// Default tag plus `extra`, without build-time tags
    #[must_use]
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tags = vec![DEFAULT_SKIP_TAG.to_string()];
        for tag in extra {
            let tag = tag.into();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Self { tags }
    }

    /// Default tag, build-time tags, then configured tags
    #[must_use]
    pub fn from_config(config: &AuditConfig) -> Self {
        let build = BUILD_SKIP_TAGS.map(parse_tag_list).unwrap_or_default();
        Self::new(build.into_iter().chain(config.skip_tags.iter().cloned()))
    }

    /// First skip tag the story carries
    #[must_use]
    pub fn matched<'a, S: AsRef<str>>(&'a self, story_tags: &[S]) -> Option<&'a str> {
        self.tags
            .iter()
            .find(|tag| story_tags.iter().any(|t| t.as_ref() == tag.as_str()))
            .map(String::as_str)
    }

    /// All tags
    #[inline]
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

/// Parse an injected JSON tag list; anything unparsable yields no tags
#[must_use]
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(tags) => tags,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed ACCESSLINT_SKIP_TAGS");
            Vec::new()
        }
    }
}
