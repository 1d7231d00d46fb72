//! # Constraint Engine
//!
//! Cross-field constraint rules, one section per form block. Three
//! rule shapes appear:
//!
//! - **Conditional-required ratchet**: a dependent field is forced on
//!   whenever any driver is on; the forcing is one-directional — the
//!   engine pushes toward "on" but never unchecks on the user's
//!   behalf.
//! - **Empty-only preset**: a default value written only into an
//!   empty field, at initialization and on each driver change. A
//!   non-empty field is never touched, so re-evaluation is idempotent.
//! - **Visibility toggle**: a container's visibility is a pure
//!   function of current driver state, with no path dependence.
//!
//! Each section publishes one summarizing change event per logical
//! user action, never one per internal field write, so subscribers
//! can treat the stream as coarse-grained "something relevant
//! changed" signals.

pub mod dimensions;
pub mod extras;
pub mod hanging;
pub mod masking;
pub mod service;

use crate::document::Surface;

/// Placeholder rendered where a derived value is unavailable.
pub(crate) const DASH: &str = "—";

/// Whether a field currently holds no user-entered value.
pub(crate) fn is_blank(doc: &dyn Surface, key: &str) -> bool {
    doc.value(key).map_or(true, |v| v.trim().is_empty())
}

/// Empty-only preset: write `value` only if the field is blank.
pub(crate) fn set_if_empty(doc: &mut dyn Surface, key: &str, value: &str) {
    if doc.exists(key) && is_blank(doc, key) {
        doc.set_value(key, value);
    }
}
