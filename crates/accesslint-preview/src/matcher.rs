//! `toBeAccessible` assertion
//!
//! Audits the whole document, keeps what lies inside the element under test,
//! and drops disabled rules locally. Engine configuration is left alone.

use crate::scope::scope_violations;
use accesslint_core::{
    Document, ElementRef, EngineError, RawViolation, RuleCatalog, RuleEngine, Violation,
};
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Per-assertion options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatcherOptions {
    /// Rules ignored by this assertion only
    pub disabled_rules: BTreeSet<String>,
}

impl MatcherOptions {
    /// With rules ignored by this assertion
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
}

/// Matcher verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// No violations inside the element
    pub pass: bool,
    /// Message for the failing direction (plain or negated)
    pub message: String,
    /// Violations that caused a failure
    pub violations: Vec<Violation>,
}

/// Assert that `root` has no accessibility violations
///
/// # Errors
/// Any `EngineError` from the single-shot audit
pub fn to_be_accessible<E: RuleEngine + ?Sized>(
    engine: &E,
    document: &dyn Document,
    root: ElementRef,
    options: &MatcherOptions,
) -> Result<MatchOutcome, EngineError> {
    let result = engine.run_audit(document)?;
    let violations: Vec<Violation> = scope_violations(result.violations, document, Some(root))
        .into_iter()
        .map(|RawViolation { violation, .. }| violation)
        .filter(|v| !options.disabled_rules.contains(&v.rule_id))
        .collect();

    let pass = violations.is_empty();
    let message = if pass {
        "Expected element to have accessibility violations, but none were found".to_string()
    } else {
        let summary = violations
            .iter()
            .map(|v| format_violation(engine, v))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!(
            "Expected element to have no accessibility violations, but found {}:\n\n{summary}",
            violations.len()
        )
    };

    Ok(MatchOutcome {
        pass,
        message,
        violations,
    })
}

/// `  rule [level] (refs): message` then the selector on its own line
fn format_violation<C: RuleCatalog + ?Sized>(catalog: &C, v: &Violation) -> String {
    let meta = catalog.rule(&v.rule_id);
    let mut line = format!("  {}", v.rule_id);
    if let Some(level) = meta.as_ref().and_then(|m| m.level) {
        let _ = write!(line, " [{level}]");
    }
    if let Some(meta) = meta.as_ref().filter(|m| !m.wcag.is_empty()) {
        let _ = write!(line, " ({})", meta.wcag.join(", "));
    }
    let _ = write!(line, ": {}\n    {}", v.message, v.selector);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use accesslint_core::{Impact, Level};
    use accesslint_test_utils::{rule, violation, EngineCounters, FakeDocument, ScriptedEngine};
    use pretty_assertions::assert_eq;

    fn document() -> FakeDocument {
        FakeDocument::new()
            .with_element("#canvas", None)
            .with_element("img", Some("#canvas"))
            .with_element("p.muted", Some("#canvas"))
            .with_element("header", None)
    }

    #[test]
    fn passes_when_nothing_inside_root() {
        let engine = ScriptedEngine::new([])
            .with_violations(vec![violation("region", "header", Impact::Moderate)]);
        let doc = document();

        let outcome =
            to_be_accessible(&engine, &doc, doc.element("#canvas"), &MatcherOptions::default())
                .unwrap();

        assert!(outcome.pass);
        assert_eq!(
            outcome.message,
            "Expected element to have accessibility violations, but none were found"
        );
    }

    #[test]
    fn failure_message_lists_each_violation() {
        let engine = ScriptedEngine::new([
            rule("image-alt", Level::A, &["1.1.1"]),
            rule("color-contrast", Level::AA, &["1.4.3", "1.4.6"]),
        ])
        .with_violations(vec![
            violation("image-alt", "img", Impact::Critical),
            violation("color-contrast", "p.muted", Impact::Serious),
            violation("custom", "p.muted", Impact::Minor),
        ]);
        let doc = document();

        let outcome =
            to_be_accessible(&engine, &doc, doc.element("#canvas"), &MatcherOptions::default())
                .unwrap();

        assert!(!outcome.pass);
        assert_eq!(
            outcome.message,
            "Expected element to have no accessibility violations, but found 3:\n\n\
             \x20 image-alt [A] (1.1.1): image-alt failed\n    img\n\n\
             \x20 color-contrast [AA] (1.4.3, 1.4.6): color-contrast failed\n    p.muted\n\n\
             \x20 custom: custom failed\n    p.muted"
        );
    }

    #[test]
    fn disabled_rules_do_not_touch_engine_config() {
        let engine = ScriptedEngine::new([])
            .with_violations(vec![violation("image-alt", "img", Impact::Critical)]);
        let doc = document();
        let options = MatcherOptions::default().with_disabled_rules(["image-alt"]);

        let outcome = to_be_accessible(&engine, &doc, doc.element("#canvas"), &options).unwrap();

        assert!(outcome.pass);
        assert!(engine.disabled().is_empty());
        assert_eq!(EngineCounters::get(&engine.counters().configures), 0);
        assert_eq!(EngineCounters::get(&engine.counters().single_shot), 1);
    }
}
