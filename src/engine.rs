//! # Engine: Boot, Routing and Dispatch
//!
//! The one-shot composition point. An [`Engine`] owns the document,
//! the event bus, the binding registry and the form sections, and
//! exposes the user-action entry points the embedding layer forwards
//! real input events into.
//!
//! ## Boot
//!
//! `boot()` initializes every section in a fixed order (masking,
//! service, hanging, extras, dimensions, pricing formsets, price
//! preview, rules router). Each step is gated on the binding
//! registry, so running the full boot sequence twice produces exactly
//! the same listener set — and the same single `init` event per
//! section — as running it once.
//!
//! ## Routing
//!
//! Instead of ad-hoc string-suffix checks at dispatch time, each
//! section declares a route table at boot: (field matcher, trigger) →
//! section. Field-role suffixes are classified in exactly one place
//! and the table is independently testable.
//!
//! ## Dispatch
//!
//! Entry points run to completion: the matched section handlers run
//! first (constraint enforcement lands in the document), then the
//! event queue drains FIFO — sections in registration order, then
//! external taps — before the call returns. Rule transitions are
//! idempotent, so the drain reaches a fixed point; a depth guard
//! bounds the pathological case.

use crate::binding::BindingRegistry;
use crate::bus::{Change, EventBus, Tap, Topic};
use crate::decimal;
use crate::document::{Document, Surface};
use crate::formset::PricingSection;
use crate::preview::PricePreviewSection;
use crate::rules::dimensions::DimensionsSection;
use crate::rules::extras::ExtrasSection;
use crate::rules::hanging::HangingSection;
use crate::rules::masking::MaskingSection;
use crate::rules::service::ServiceSection;

/// Cap on events delivered in one drain. Rule idempotence makes the
/// queue converge long before this; the guard only catches bugs.
const MAX_DELIVERIES: usize = 64;

/// Which user gesture reached a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A keystroke changed the value.
    Input,
    /// The value was committed (checkbox toggle, select change).
    Change,
    /// Focus left the field.
    Blur,
    /// A button was activated.
    Click,
}

/// Declarative field matcher for the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Exact element id.
    Id(String),
    /// Field-name suffix (falls back to the id for nameless nodes).
    Suffix(&'static str),
    /// Field-name suffix, restricted to one group's nodes.
    GroupSuffix {
        prefix: String,
        suffix: &'static str,
    },
}

impl Matcher {
    /// Whether a key (id or field name) matches.
    pub fn matches(&self, doc: &dyn Surface, key: &str) -> bool {
        match self {
            Matcher::Id(id) => doc.id_of(key).as_deref() == Some(id),
            Matcher::Suffix(suffix) => ends_with(doc, key, suffix),
            Matcher::GroupSuffix { prefix, suffix } => {
                doc.group_of(key).as_deref() == Some(prefix) && ends_with(doc, key, suffix)
            }
        }
    }
}

fn ends_with(doc: &dyn Surface, key: &str, suffix: &str) -> bool {
    match doc.name_of(key) {
        Some(name) => name.ends_with(suffix),
        None => doc.id_of(key).is_some_and(|id| id.ends_with(suffix)),
    }
}

/// One route table entry.
#[derive(Debug, Clone)]
pub struct Route {
    pub trigger: Trigger,
    pub matcher: Matcher,
}

impl Route {
    pub fn new(trigger: Trigger, matcher: Matcher) -> Self {
        Self { trigger, matcher }
    }
}

/// What a section handler may reach besides the document: the bus to
/// publish on and the registry for one-time setup claims.
pub struct Dispatch<'a> {
    pub bus: &'a mut EventBus,
    pub registry: &'a mut BindingRegistry,
}

impl Dispatch<'_> {
    /// Publish a change event for delivery in the current drain.
    pub fn publish(&mut self, change: Change) {
        self.bus.publish(change);
    }
}

/// An independently-initialized form section.
///
/// Sections communicate only through the bus and one-directional
/// document reads; no section holds a reference to another.
pub trait Section {
    /// Stable section name (binding-registry key, diagnostics).
    fn name(&self) -> &'static str;

    /// One-time initialization. Returns `false` when the section's
    /// elements are absent from this page — the section then stays
    /// inactive, silently, with no binding performed.
    fn boot(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch) -> bool;

    /// The section's route table entries, built once after boot.
    fn routes(&self, doc: &dyn Surface) -> Vec<Route>;

    /// A routed user gesture reached this section.
    fn on_field(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch, key: &str, trigger: Trigger);

    /// Topics this section subscribes to.
    fn topics(&self) -> &'static [Topic] {
        &[]
    }

    /// A subscribed event was delivered.
    fn on_change(&mut self, _doc: &mut dyn Surface, _ctx: &mut Dispatch, _change: &Change) {}
}

/// No-op event sink subscribed to every topic, reserved for future
/// cross-section rules.
#[derive(Debug, Default)]
pub struct RouterSection;

impl Section for RouterSection {
    fn name(&self) -> &'static str {
        "rules-router"
    }

    fn boot(&mut self, _doc: &mut dyn Surface, _ctx: &mut Dispatch) -> bool {
        true
    }

    fn routes(&self, _doc: &dyn Surface) -> Vec<Route> {
        Vec::new()
    }

    fn on_field(
        &mut self,
        _doc: &mut dyn Surface,
        _ctx: &mut Dispatch,
        _key: &str,
        _trigger: Trigger,
    ) {
    }

    fn topics(&self) -> &'static [Topic] {
        &Topic::ALL
    }
}

struct SectionSlot {
    section: Box<dyn Section>,
    active: bool,
}

/// The form engine.
///
/// ```
/// use pozform::{Engine, Surface};
///
/// let doc = pozform::sample::order_form();
/// let mut engine = Engine::new(doc);
/// engine.boot();
/// engine.toggle("id_paslauga_ktl", true);
/// assert!(engine.doc().is_checked("id_paslauga_paruosimas"));
/// ```
pub struct Engine {
    doc: Document,
    bus: EventBus,
    registry: BindingRegistry,
    sections: Vec<SectionSlot>,
    routes: Vec<(usize, Route)>,
}

impl Engine {
    /// Create an engine over a document with the standard sections.
    pub fn new(doc: Document) -> Self {
        let sections: Vec<Box<dyn Section>> = vec![
            Box::new(MaskingSection::default()),
            Box::new(ServiceSection::default()),
            Box::new(HangingSection::default()),
            Box::new(ExtrasSection::default()),
            Box::new(DimensionsSection::default()),
            Box::new(PricingSection::default()),
            Box::new(PricePreviewSection::default()),
            Box::new(RouterSection),
        ];
        Self {
            doc,
            bus: EventBus::new(),
            registry: BindingRegistry::new(),
            sections: sections
                .into_iter()
                .map(|section| SectionSlot {
                    section,
                    active: false,
                })
                .collect(),
            routes: Vec::new(),
        }
    }

    /// Read access to the document.
    pub fn doc(&self) -> &Document {
        &self.doc
    }

    /// The binding registry (idempotence checks, diagnostics).
    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    /// Register an external tap for one topic. Must happen before the
    /// events of interest are published; taps live for the page.
    pub fn subscribe(&mut self, topic: Topic, tap: Tap) {
        self.bus.subscribe(topic, tap);
    }

    /// Register an external tap for every topic.
    pub fn subscribe_all(&mut self, tap: Tap) {
        self.bus.subscribe_all(tap);
    }

    /// The route table, for inspection and tests.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().map(|(_, r)| r)
    }

    /// One-shot initialization; safe to invoke any number of times.
    pub fn boot(&mut self) {
        for field in self.doc.decimal_fields() {
            self.registry.claim(&field, "decimal");
        }

        for i in 0..self.sections.len() {
            let name = self.sections[i].section.name();
            if !self.registry.claim(name, "section-boot") {
                continue;
            }
            let Engine {
                doc,
                bus,
                registry,
                sections,
                routes,
            } = self;
            let mut ctx = Dispatch { bus, registry };
            let active = sections[i].section.boot(doc, &mut ctx);
            sections[i].active = active;
            if active {
                let doc_ref: &dyn Surface = doc;
                let new_routes = sections[i].section.routes(doc_ref);
                routes.extend(new_routes.into_iter().map(|r| (i, r)));
            } else {
                tracing::debug!(section = name, "section inactive (elements absent)");
            }
        }

        self.drain();
    }

    /// A keystroke changed a field's value.
    pub fn input(&mut self, key: &str) {
        self.live_decimal_pass(key);
        self.dispatch_field(key, Trigger::Input);
        self.drain();
    }

    /// A field's value was committed.
    pub fn change(&mut self, key: &str) {
        self.dispatch_field(key, Trigger::Change);
        self.drain();
    }

    /// Focus left a field.
    pub fn blur(&mut self, key: &str) {
        self.blur_decimal_pass(key);
        self.dispatch_field(key, Trigger::Blur);
        self.drain();
    }

    /// A button was activated.
    pub fn click(&mut self, key: &str) {
        self.dispatch_field(key, Trigger::Click);
        self.drain();
    }

    // ------------------------------------------------------------------
    // User-gesture conveniences (tests, CLI scripts)
    // ------------------------------------------------------------------

    /// Programmatic write with no events.
    pub fn set_value(&mut self, key: &str, value: &str) -> bool {
        self.doc.set_value(key, value)
    }

    /// Type a value: write it, then fire the input trigger.
    pub fn type_into(&mut self, key: &str, value: &str) {
        self.doc.set_value(key, value);
        self.input(key);
    }

    /// Type a value and leave the field: input, then blur.
    pub fn commit(&mut self, key: &str, value: &str) {
        self.type_into(key, value);
        self.blur(key);
    }

    /// Toggle a checkbox. Disabled checkboxes ignore the gesture,
    /// exactly as a disabled element swallows clicks.
    pub fn toggle(&mut self, key: &str, on: bool) -> bool {
        if !self.doc.is_enabled(key) {
            return false;
        }
        if !self.doc.set_checked(key, on) {
            return false;
        }
        self.change(key);
        true
    }

    /// Pick a select option: write the value, fire the change trigger.
    pub fn choose(&mut self, key: &str, value: &str) {
        self.doc.set_value(key, value);
        self.change(key);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Keystroke-time decimal pass: comma → period, nothing else.
    fn live_decimal_pass(&mut self, key: &str) {
        let Some(id) = self.doc.id_of(key) else { return };
        if !self.registry.bound(&id, "decimal") {
            return;
        }
        if let Some(value) = self.doc.value(&id)
            && let Some(fixed) = decimal::live(&value)
        {
            self.doc.set_value(&id, &fixed);
        }
    }

    /// Blur-time decimal pass: full normalization; a price field also
    /// notifies the pricing channel so previews recompute.
    fn blur_decimal_pass(&mut self, key: &str) {
        let Some(id) = self.doc.id_of(key) else { return };
        if !self.registry.bound(&id, "decimal") {
            return;
        }
        let Some(value) = self.doc.value(&id) else { return };
        let normalized = decimal::normalize(&value, self.doc.decimals(&id));
        if normalized != value {
            self.doc.set_value(&id, &normalized);
        }

        if self.doc.name_of(&id).is_some_and(|n| n.ends_with("-kaina")) {
            let prefix = self.doc.group_of(&id);
            self.bus.publish(Change::Pricing {
                prefix,
                reason: "decimal-blur",
            });
        }
    }

    fn dispatch_field(&mut self, key: &str, trigger: Trigger) {
        if !self.doc.exists(key) {
            return;
        }
        let mut matched: Vec<usize> = self
            .routes
            .iter()
            .filter(|(i, route)| {
                self.sections[*i].active
                    && route.trigger == trigger
                    && route.matcher.matches(&self.doc, key)
            })
            .map(|(i, _)| *i)
            .collect();
        matched.dedup();

        for i in matched {
            let Engine {
                doc,
                bus,
                registry,
                sections,
                ..
            } = self;
            let mut ctx = Dispatch { bus, registry };
            sections[i].section.on_field(doc, &mut ctx, key, trigger);
        }
    }

    /// Deliver every pending event: sections in registration order,
    /// then taps. Events published while handling are appended and
    /// delivered in the same drain.
    fn drain(&mut self) {
        let mut delivered = 0;
        while let Some(change) = self.bus.pop() {
            delivered += 1;
            if delivered > MAX_DELIVERIES {
                tracing::warn!(
                    pending = self.bus.pending(),
                    "event drain exceeded depth guard; dropping backlog"
                );
                self.bus.clear();
                return;
            }
            tracing::debug!(event = change.name(), reason = change.reason(), "deliver");

            let topic = change.topic();
            for i in 0..self.sections.len() {
                if !self.sections[i].active || !self.sections[i].section.topics().contains(&topic) {
                    continue;
                }
                let Engine {
                    doc,
                    bus,
                    registry,
                    sections,
                    ..
                } = self;
                let mut ctx = Dispatch { bus, registry };
                sections[i].section.on_change(doc, &mut ctx, &change);
            }
            self.bus.deliver_to_taps(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Node;

    #[test]
    fn test_matcher_by_id_and_name() {
        let mut doc = Document::new();
        doc.push_node(Node::text_input("id_kainos-0-kaina").named("kainos-0-kaina"))
            .unwrap();

        let by_id = Matcher::Id("id_kainos-0-kaina".into());
        assert!(by_id.matches(&doc, "id_kainos-0-kaina"));
        assert!(by_id.matches(&doc, "kainos-0-kaina"));
        assert!(!by_id.matches(&doc, "id_other"));

        let by_suffix = Matcher::Suffix("-kaina");
        assert!(by_suffix.matches(&doc, "id_kainos-0-kaina"));
        assert!(!by_suffix.matches(&doc, "missing"));
    }

    #[test]
    fn test_group_suffix_requires_membership() {
        let mut doc = Document::new();
        doc.push_node(
            Node::text_input("id_kainos-0-kaina")
                .named("kainos-0-kaina")
                .in_row("kainos", 0),
        )
        .unwrap();
        doc.push_node(Node::text_input("id_kitas-kaina").named("kitas-kaina"))
            .unwrap();

        let m = Matcher::GroupSuffix {
            prefix: "kainos".into(),
            suffix: "-kaina",
        };
        assert!(m.matches(&doc, "kainos-0-kaina"));
        assert!(!m.matches(&doc, "kitas-kaina"));
    }

    #[test]
    fn test_suffix_falls_back_to_id_for_nameless_nodes() {
        let mut doc = Document::new();
        doc.push_node(Node::button("maskavimas_ktl-0-remove")).unwrap();
        let m = Matcher::Suffix("-remove");
        assert!(m.matches(&doc, "maskavimas_ktl-0-remove"));
    }

    #[test]
    fn test_depth_guard_drops_backlog() {
        // a bus stuffed beyond the guard drains without hanging
        let mut engine = Engine::new(Document::new());
        for _ in 0..(MAX_DELIVERIES + 10) {
            engine.bus.publish(Change::Extras {
                yra: true,
                reason: "change",
            });
        }
        engine.drain();
        assert_eq!(engine.bus.pending(), 0);
    }
}
