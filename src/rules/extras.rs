//! Extra-services block rules.
//!
//! The free-text description row is visible iff the yes/no select
//! holds "taip". Visibility only: text the user already typed stays in
//! the hidden field untouched — the engine never discards data it
//! doesn't own.

use crate::bus::Change;
use crate::document::Surface;
use crate::engine::{Dispatch, Matcher, Route, Section, Trigger};

const SELECT: &str = "id_papildomos_paslaugos";
const DESCRIPTION_ROW: &str = "papildomos-paslaugos-aprasymas-row";

/// The select's "yes" choice value.
const YES: &str = "taip";

/// The extra-services section.
#[derive(Debug, Default)]
pub struct ExtrasSection;

impl ExtrasSection {
    fn sync(&self, doc: &mut dyn Surface, ctx: &mut Dispatch, reason: &'static str) {
        let yra = doc
            .value(SELECT)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(YES));
        doc.set_visible(DESCRIPTION_ROW, yra);
        ctx.publish(Change::Extras { yra, reason });
    }
}

impl Section for ExtrasSection {
    fn name(&self) -> &'static str {
        "papildomos"
    }

    fn boot(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch) -> bool {
        if !doc.exists(SELECT) || !doc.exists(DESCRIPTION_ROW) {
            return false;
        }
        self.sync(doc, ctx, "init");
        true
    }

    fn routes(&self, _doc: &dyn Surface) -> Vec<Route> {
        vec![Route::new(Trigger::Change, Matcher::Id(SELECT.into()))]
    }

    fn on_field(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch, _key: &str, _trigger: Trigger) {
        self.sync(doc, ctx, "change");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingRegistry;
    use crate::bus::EventBus;
    use crate::document::{Document, Node};

    fn extras_doc() -> Document {
        let mut doc = Document::new();
        doc.push_node(Node::select(SELECT).with_value("ne")).unwrap();
        doc.push_node(Node::container(DESCRIPTION_ROW)).unwrap();
        doc.push_node(Node::textarea("id_papildomos_paslaugos_aprasymas"))
            .unwrap();
        doc
    }

    fn sync(doc: &mut Document, section: &mut ExtrasSection, bus: &mut EventBus) {
        let mut registry = BindingRegistry::new();
        let mut ctx = Dispatch {
            bus,
            registry: &mut registry,
        };
        section.sync(doc, &mut ctx, "change");
    }

    #[test]
    fn test_row_visible_only_on_yes() {
        let mut doc = extras_doc();
        let mut section = ExtrasSection;
        let mut bus = EventBus::new();

        sync(&mut doc, &mut section, &mut bus);
        assert!(!doc.is_visible(DESCRIPTION_ROW));

        doc.set_value(SELECT, "taip");
        sync(&mut doc, &mut section, &mut bus);
        assert!(doc.is_visible(DESCRIPTION_ROW));

        assert_eq!(
            bus.pop().unwrap(),
            Change::Extras {
                yra: false,
                reason: "change"
            }
        );
        assert_eq!(
            bus.pop().unwrap(),
            Change::Extras {
                yra: true,
                reason: "change"
            }
        );
    }

    #[test]
    fn test_hiding_preserves_description_text() {
        let mut doc = extras_doc();
        let mut section = ExtrasSection;
        let mut bus = EventBus::new();

        doc.set_value(SELECT, "taip");
        sync(&mut doc, &mut section, &mut bus);
        doc.set_value("id_papildomos_paslaugos_aprasymas", "sandblast first");

        doc.set_value(SELECT, "ne");
        sync(&mut doc, &mut section, &mut bus);
        assert!(!doc.is_visible(DESCRIPTION_ROW));
        assert_eq!(
            doc.value("id_papildomos_paslaugos_aprasymas").unwrap(),
            "sandblast first"
        );
    }
}
