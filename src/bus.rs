//! # Event Bus
//!
//! Typed, fire-and-forget publish/subscribe over named change events.
//! Form sections never call each other: a section mutates its own
//! fields, publishes a [`Change`], and independently-initialized
//! sections subscribed to that topic recompute their own derived
//! state.
//!
//! ## Delivery model
//!
//! ```text
//! ┌─────────┐ publish ┌─────────┐  drain  ┌──────────┐     ┌──────┐
//! │ Section │ ──────► │  Queue  │ ──────► │ Sections │ ──► │ Taps │
//! └─────────┘         │ (FIFO)  │         │ (topic)  │     └──────┘
//!                     └─────────┘         └──────────┘
//! ```
//!
//! `publish` enqueues; the engine drains the queue in FIFO order
//! before each user-action entry point returns, delivering every event
//! to subscribed sections (registration order) and then to external
//! taps. A handler may publish further events while handling one —
//! they are appended and fully delivered in the same drain. Rule state
//! transitions are idempotent, so the drain reaches a fixed point; a
//! depth guard bounds the pathological case.
//!
//! Events carry no return value and a free-form `reason` tag consumed
//! only for diagnostics — subscribers never branch on it for
//! correctness.

use serde::Serialize;
use std::collections::VecDeque;

/// The named event channels of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// Price row group changed (`kainos:changed`)
    Pricing,
    /// Service block changed (`paslauga:changed`)
    Service,
    /// Masking row group changed (`maskavimas:changed`)
    Masking,
    /// Extra-services block changed (`papildomos:changed`)
    Extras,
    /// Overall dimensions changed (`xyz:changed`)
    Dimensions,
    /// Hanging block changed (`kabinimas:changed`)
    Hanging,
}

impl Topic {
    /// Every topic, in a stable order. The rules router subscribes to
    /// all of them.
    pub const ALL: [Topic; 6] = [
        Topic::Pricing,
        Topic::Service,
        Topic::Masking,
        Topic::Extras,
        Topic::Dimensions,
        Topic::Hanging,
    ];

    /// The event name as published on the wire contract.
    pub fn event_name(self) -> &'static str {
        match self {
            Topic::Pricing => "kainos:changed",
            Topic::Service => "paslauga:changed",
            Topic::Masking => "maskavimas:changed",
            Topic::Extras => "papildomos:changed",
            Topic::Dimensions => "xyz:changed",
            Topic::Hanging => "kabinimas:changed",
        }
    }
}

/// An immutable named change event with its attribute bag.
///
/// One variant per published event. Serializes with the event name in
/// an `"event"` tag, which is exactly the shape the CLI event log
/// prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum Change {
    /// A price row group changed.
    #[serde(rename = "kainos:changed")]
    Pricing {
        /// Formset prefix, absent for a price field outside any group.
        #[serde(skip_serializing_if = "Option::is_none")]
        prefix: Option<String>,
        reason: &'static str,
    },
    /// The service block (KTL / Miltai / Paruošimas) changed.
    #[serde(rename = "paslauga:changed")]
    Service {
        ktl: bool,
        miltai: bool,
        paruosimas: bool,
        reason: &'static str,
        /// Which driver caused the change, when known.
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<&'static str>,
    },
    /// A masking row group changed.
    #[serde(rename = "maskavimas:changed")]
    Masking {
        prefix: String,
        /// Visible (non-deleted, non-placeholder) row count.
        count: usize,
        reason: &'static str,
    },
    /// The extra-services block changed.
    #[serde(rename = "papildomos:changed")]
    Extras { yra: bool, reason: &'static str },
    /// The X/Y/Z dimension fields changed.
    #[serde(rename = "xyz:changed")]
    Dimensions {
        x: String,
        y: String,
        z: String,
        reason: &'static str,
    },
    /// The hanging block changed.
    #[serde(rename = "kabinimas:changed")]
    Hanging {
        ktl: bool,
        miltai: bool,
        reason: &'static str,
    },
}

impl Change {
    /// The topic this event belongs to.
    pub fn topic(&self) -> Topic {
        match self {
            Change::Pricing { .. } => Topic::Pricing,
            Change::Service { .. } => Topic::Service,
            Change::Masking { .. } => Topic::Masking,
            Change::Extras { .. } => Topic::Extras,
            Change::Dimensions { .. } => Topic::Dimensions,
            Change::Hanging { .. } => Topic::Hanging,
        }
    }

    /// The event name on the wire contract.
    pub fn name(&self) -> &'static str {
        self.topic().event_name()
    }

    /// The diagnostic reason tag.
    pub fn reason(&self) -> &'static str {
        match self {
            Change::Pricing { reason, .. }
            | Change::Service { reason, .. }
            | Change::Masking { reason, .. }
            | Change::Extras { reason, .. }
            | Change::Dimensions { reason, .. }
            | Change::Hanging { reason, .. } => reason,
        }
    }
}

/// External fire-and-forget subscriber (event log, diagnostics).
///
/// A failing tap must not prevent delivery to subsequent subscribers,
/// so taps return a `Result` and the bus logs and continues.
pub type Tap = Box<dyn FnMut(&Change) -> Result<(), Box<dyn std::error::Error>>>;

/// The event bus: a FIFO pending queue plus external taps.
///
/// The bus does not deduplicate subscribers by identity — at-most-once
/// subscription is enforced by callers through the binding registry.
/// There is no unsubscribe: bus lifetime equals page lifetime.
#[derive(Default)]
pub struct EventBus {
    taps: Vec<(Option<Topic>, Tap)>,
    queue: VecDeque<Change>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tap for one topic.
    pub fn subscribe(&mut self, topic: Topic, tap: Tap) {
        self.taps.push((Some(topic), tap));
    }

    /// Register a tap for every topic.
    pub fn subscribe_all(&mut self, tap: Tap) {
        self.taps.push((None, tap));
    }

    /// Enqueue an event for delivery.
    pub fn publish(&mut self, change: Change) {
        tracing::debug!(event = change.name(), reason = change.reason(), "publish");
        self.queue.push_back(change);
    }

    /// Take the next pending event, FIFO.
    pub(crate) fn pop(&mut self) -> Option<Change> {
        self.queue.pop_front()
    }

    /// Number of events still pending.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drop all pending events. Used by the drain depth guard.
    pub(crate) fn clear(&mut self) {
        self.queue.clear();
    }

    /// Deliver one event to every matching tap, in registration order.
    ///
    /// Tap failures are isolated: logged, then delivery continues.
    pub(crate) fn deliver_to_taps(&mut self, change: &Change) {
        for (topic, tap) in &mut self.taps {
            if topic.is_some_and(|t| t != change.topic()) {
                continue;
            }
            if let Err(e) = tap(change) {
                tracing::warn!(event = change.name(), error = %e, "tap failed");
            }
        }
    }
}
