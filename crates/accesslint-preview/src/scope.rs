//! Selector scoping
//!
//! Keeps only violations whose element lies inside the unit under test.
//! Membership fails closed: an unparsable selector, a selector with no
//! match, or a match outside the root all drop the violation. A missing
//! root fails open and returns everything.

use accesslint_core::{local_selector, Document, ElementRef, Violation};
use std::borrow::Borrow;

/// Filter `violations` to those inside `root`
///
/// One selector query per violation. Idempotent for a fixed document and
/// root.
pub fn scope_violations<V: Borrow<Violation>>(
    violations: Vec<V>,
    document: &dyn Document,
    root: Option<ElementRef>,
) -> Vec<V> {
    let Some(root) = root else {
        return violations;
    };
    violations
        .into_iter()
        .filter(|v| is_within(v.borrow(), document, root))
        .collect()
}

/// Whether a single violation's element is inside `root`
#[must_use]
pub fn is_within(violation: &Violation, document: &dyn Document, root: ElementRef) -> bool {
    let selector = local_selector(&violation.selector);
    match document.query_selector(selector) {
        Ok(Some(el)) => document.contains(root, el),
        Ok(None) => {
            tracing::trace!(rule = %violation.rule_id, selector, "no element matches; excluded");
            false
        }
        Err(e) => {
            tracing::trace!(rule = %violation.rule_id, error = %e, "unresolvable selector; excluded");
            false
        }
    }
}
