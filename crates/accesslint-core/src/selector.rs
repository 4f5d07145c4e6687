//! Boundary-piercing selector handling
//!
//! Engines that audit a page containing a sandboxed frame emit selectors of
//! the form `<outer> >>> iframe> <inner>`. The host document used for
//! scoping and highlighting is already the inner document, so only the
//! trailing inner selector resolves locally.

/// Combinator separating the outer path from the sandboxed inner selector
pub const PIERCE_COMBINATOR: &str = ">>>";

const FRAME_STEP: &str = "iframe>";

/// Locally resolvable part of a (possibly piercing) selector
///
/// Nested sandboxes are handled by keeping only the innermost segment.
/// Non-piercing selectors are returned trimmed.
#[must_use]
pub fn local_selector(selector: &str) -> &str {
    let inner = match selector.rfind(PIERCE_COMBINATOR) {
        Some(idx) => &selector[idx + PIERCE_COMBINATOR.len()..],
        None => return selector.trim(),
    };
    let inner = inner.trim_start();
    inner
        .strip_prefix(FRAME_STEP)
        .unwrap_or(inner)
        .trim()
}

/// Whether the selector crosses a sandbox boundary
#[inline]
#[must_use]
pub fn is_piercing(selector: &str) -> bool {
    selector.contains(PIERCE_COMBINATOR)
}
