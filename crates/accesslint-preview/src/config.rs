//! Audit configuration
//!
//! Consumed, not owned: the host decides which rules are disabled, which tags
//! skip a story, and whether violations fail a test or only warn. Loaded from
//! TOML with kebab-case keys; every key is optional.
//!
//! ```toml
//! test = "todo"
//! disabled-rules = ["color-contrast"]
//! skip-tags = ["experimental"]
//! slice-budget-ms = 12
//! chunked = true
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

/// Default per-slice budget for incremental audits
pub const DEFAULT_SLICE_BUDGET_MS: u64 = 12;

/// How violations affect the report status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestMode {
    /// Violations fail
    #[default]
    Error,
    /// Violations only warn
    Todo,
}

/// Audit configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AuditConfig {
    /// Rule ids never reported
    pub disabled_rules: BTreeSet<String>,
    /// Extra skip tags on top of the fixed default
    pub skip_tags: Vec<String>,
    /// Failing or advisory mode
    pub test: TestMode,
    /// Per-slice budget in milliseconds
    pub slice_budget_ms: u64,
    /// Use the incremental scheduler instead of a single blocking pass
    pub chunked: bool,
}

impl AuditConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With disabled rules
    #[inline]
    #[must_use]
    pub fn with_disabled_rules<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled_rules = rules.into_iter().map(Into::into).collect();
        self
    }

    /// With extra skip tags
    #[inline]
    #[must_use]
    pub fn with_skip_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// With test mode
    #[inline]
    #[must_use]
    pub fn with_test_mode(mut self, mode: TestMode) -> Self {
        self.test = mode;
        self
    }

    /// With per-slice budget
    #[inline]
    #[must_use]
    pub fn with_slice_budget(mut self, budget: Duration) -> Self {
        self.slice_budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With chunked or single-shot audits
    #[inline]
    #[must_use]
    pub fn with_chunked(mut self, chunked: bool) -> Self {
        self.chunked = chunked;
        self
    }

    /// Per-slice budget as a duration
    #[inline]
    #[must_use]
    pub fn slice_budget(&self) -> Duration {
        Duration::from_millis(self.slice_budget_ms)
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// `ConfigError::Parse` on invalid TOML or unknown enum values
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` on invalid TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// `ConfigError::Invalid` if the configuration cannot be rendered
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.slice_budget_ms == 0 {
            return Err(ConfigError::Invalid(
                "slice-budget-ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            disabled_rules: BTreeSet::new(),
            skip_tags: Vec::new(),
            test: TestMode::Error,
            slice_budget_ms: DEFAULT_SLICE_BUDGET_MS,
            chunked: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(AuditConfig::from_toml_str("").unwrap(), AuditConfig::default());
    }

    #[test]
    fn parses_all_keys() {
        let config = AuditConfig::from_toml_str(
            r#"
            test = "todo"
            disabled-rules = ["color-contrast", "region"]
            skip-tags = ["experimental"]
            slice-budget-ms = 20
            chunked = false
            "#,
        )
        .unwrap();

        assert_eq!(config.test, TestMode::Todo);
        assert!(config.disabled_rules.contains("region"));
        assert_eq!(config.skip_tags, ["experimental"]);
        assert_eq!(config.slice_budget(), Duration::from_millis(20));
        assert!(!config.chunked);
    }

    #[test]
    fn unknown_test_mode_is_rejected() {
        let err = AuditConfig::from_toml_str(r#"test = "strict""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rendered_toml_parses_back() {
        let config = AuditConfig::new()
            .with_disabled_rules(["region"])
            .with_test_mode(TestMode::Todo);
        let rendered = config.to_toml_string().unwrap();
        assert!(rendered.contains("disabled-rules"));
        assert_eq!(AuditConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn zero_budget_is_rejected() {
        let err = AuditConfig::from_toml_str("slice-budget-ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accesslint.toml");
        std::fs::write(&path, "test = \"todo\"\n").unwrap();
        assert_eq!(AuditConfig::load(&path).unwrap().test, TestMode::Todo);

        let missing = AuditConfig::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
