//! Violation enrichment
//!
//! Joins each violation with its rule's static metadata. A missing rule is
//! never fatal; the fields stay unset. Element handles stop here.

use accesslint_core::{EnrichedViolation, RawViolation, RuleCatalog, RuleMetadata, Violation};

/// Rule-metadata join over a catalog
pub struct Enricher<'a, C: ?Sized = dyn RuleCatalog> {
    catalog: &'a C,
}

impl<'a, C: RuleCatalog + ?Sized> Enricher<'a, C> {
    /// Enricher reading from `catalog`
    #[inline]
    #[must_use]
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Enrich one raw violation, dropping its element handle
    #[must_use]
    pub fn enrich(&self, raw: RawViolation) -> EnrichedViolation {
        self.enrich_violation(raw.violation)
    }

    /// Enrich a bare violation
    #[must_use]
    pub fn enrich_violation(&self, violation: Violation) -> EnrichedViolation {
        match self.catalog.rule(&violation.rule_id) {
            Some(meta) => attach(violation, meta),
            None => {
                tracing::trace!(rule = %violation.rule_id, "no rule metadata");
                EnrichedViolation::bare(violation)
            }
        }
    }

    /// Enrich every violation, preserving order and length
    #[must_use]
    pub fn enrich_all(&self, raw: Vec<RawViolation>) -> Vec<EnrichedViolation> {
        raw.into_iter().map(|v| self.enrich(v)).collect()
    }
}

impl<C: ?Sized> Clone for Enricher<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for Enricher<'_, C> {}

impl<C: ?Sized> std::fmt::Debug for Enricher<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enricher").finish_non_exhaustive()
    }
}

fn attach(violation: Violation, meta: RuleMetadata) -> EnrichedViolation {
    EnrichedViolation {
        violation,
        description: meta.description,
        wcag: (!meta.wcag.is_empty()).then_some(meta.wcag),
        level: meta.level,
        guidance: meta.guidance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accesslint_core::{ElementRef, Impact, Level};
    use accesslint_test_utils::{rule, violation, ScriptedEngine};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn catalog() -> ScriptedEngine {
        ScriptedEngine::new([
            rule("color-contrast", Level::AA, &["1.4.3"]),
            rule("region", Level::A, &[]),
        ])
    }

    #[test]
    fn attaches_metadata() {
        let engine = catalog();
        let enriched = Enricher::new(&engine).enrich(
            RawViolation::new(violation("color-contrast", "p.muted", Impact::Serious))
                .with_element(ElementRef(4)),
        );

        assert_eq!(enriched.rule_id(), "color-contrast");
        assert_eq!(enriched.level, Some(Level::AA));
        assert_eq!(enriched.wcag, Some(vec!["1.4.3".to_string()]));
        assert_eq!(enriched.guidance.as_deref(), Some("Fix color-contrast"));
    }

    #[test]
    fn empty_reference_list_is_unset() {
        let engine = catalog();
        let enriched =
            Enricher::new(&engine).enrich_violation(violation("region", "nav", Impact::Moderate));
        assert_eq!(enriched.wcag, None);
        assert_eq!(enriched.level, Some(Level::A));
    }

    #[test]
    fn unknown_rule_is_bare() {
        let engine = catalog();
        let v = violation("custom-rule", "div", Impact::Minor);
        let enriched = Enricher::new(&engine).enrich_violation(v.clone());
        assert_eq!(enriched, EnrichedViolation::bare(v));
    }

    proptest! {
        #[test]
        fn prop_enrichment_preserves_identity(picks in proptest::collection::vec((0usize..3, "[a-z#.]{1,12}"), 0..16)) {
            let ids = ["color-contrast", "region", "unknown"];
            let engine = catalog();
            let raw: Vec<RawViolation> = picks
                .iter()
                .map(|(i, sel)| violation(ids[*i], sel, Impact::Minor).into())
                .collect();
            let expected: Vec<(String, String)> = raw
                .iter()
                .map(|r| (r.violation.rule_id.clone(), r.violation.selector.clone()))
                .collect();

            let enriched = Enricher::new(&engine).enrich_all(raw);
            let actual: Vec<(String, String)> = enriched
                .iter()
                .map(|e| (e.rule_id().to_string(), e.selector().to_string()))
                .collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
