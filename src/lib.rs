//! # Pozform - Form-State Synchronization Engine
//!
//! Pozform keeps a multi-section industrial order form consistent as
//! it is edited: interdependent fields, repeatable row groups and
//! derived preview values, synchronized through named change events
//! instead of direct calls. It provides:
//!
//! - **Event bus**: typed, fire-and-forget publish/subscribe
//! - **Idempotent binding**: boot any number of times, bind once
//! - **Row groups**: templated formset rows with a server-accurate
//!   total count and soft deletion
//! - **Constraint rules**: conditional-required ratchets, empty-only
//!   presets, pure visibility toggles, derived previews
//!
//! The engine operates on an in-memory [`document::Document`] — the
//! stand-in for an already-rendered page — through the thin
//! [`document::Surface`] trait, so every rule is testable without a
//! browser. There is no network I/O and no rendering here; a real
//! surface bridge is the embedder's concern.
//!
//! ## Quick Start
//!
//! ```
//! use pozform::{Engine, Surface, sample};
//!
//! let mut engine = Engine::new(sample::order_form());
//! engine.boot();
//!
//! // turning on a coating ratchets the preparation checkbox on
//! engine.toggle("id_paslauga_ktl", true);
//! assert!(engine.doc().is_checked("id_paslauga_paruosimas"));
//!
//! // add a price row and type a price; the preview follows
//! engine.click("kainos-add-row-kainos");
//! engine.commit("kainos-0-kaina", "12,5");
//! assert_eq!(engine.doc().value("kaina-eur-preview").unwrap(), "12.5000 €");
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bus`] | Named change events and the publish/subscribe bus |
//! | [`binding`] | Per-node, per-concern one-time setup registry |
//! | [`decimal`] | Locale-flexible numeric normalization |
//! | [`document`] | The form document model and the `Surface` seam |
//! | [`formset`] | Repeatable row groups (add, soft-remove, totals) |
//! | [`rules`] | Cross-field constraint sections |
//! | [`preview`] | Deterministic price selection and rendering |
//! | [`engine`] | Boot, route table and event dispatch |
//! | [`sample`] | Built-in demo order form |
//! | [`error`] | Error types |

pub mod binding;
pub mod bus;
pub mod decimal;
pub mod document;
pub mod engine;
pub mod error;
pub mod formset;
pub mod preview;
pub mod rules;
pub mod sample;

// Re-exports for convenience
pub use binding::BindingRegistry;
pub use bus::{Change, EventBus, Topic};
pub use document::{Document, Surface};
pub use engine::Engine;
pub use error::PozformError;
