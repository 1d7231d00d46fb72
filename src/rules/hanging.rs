//! Hanging block rules: per-coating status labels and visibility.
//!
//! The KTL and powder hanging sub-blocks show independently, each a
//! pure function of its service checkbox. The section re-syncs both on
//! direct checkbox changes and on `paslauga:changed` from the bus, but
//! publishes `kabinimas:changed` only when the derived pair actually
//! moved — one summarizing event per logical action.

use crate::bus::{Change, Topic};
use crate::document::Surface;
use crate::engine::{Dispatch, Matcher, Route, Section, Trigger};
use crate::rules::DASH;

const KTL: &str = "id_paslauga_ktl";
const MILTAI: &str = "id_paslauga_miltai";

const KTL_STATUS: &str = "ktl-kabinimas-status";
const KTL_BLOCK: &str = "ktl-kabinimas-subblock";
const MILTAI_STATUS: &str = "miltai-kabinimas-status";
const MILTAI_BLOCK: &str = "miltai-kabinimas-subblock";

/// Status label for an enabled coating.
const STATUS_ON: &str = "Įjungta";

/// The hanging block section.
#[derive(Debug, Default)]
pub struct HangingSection {
    last_emitted: Option<(bool, bool)>,
}

impl HangingSection {
    fn sync(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch, reason: &'static str) {
        let ktl = doc.is_checked(KTL);
        let miltai = doc.is_checked(MILTAI);

        doc.set_value(KTL_STATUS, if ktl { STATUS_ON } else { DASH });
        doc.set_visible(KTL_BLOCK, ktl);
        doc.set_value(MILTAI_STATUS, if miltai { STATUS_ON } else { DASH });
        doc.set_visible(MILTAI_BLOCK, miltai);

        if self.last_emitted == Some((ktl, miltai)) {
            return;
        }
        self.last_emitted = Some((ktl, miltai));
        ctx.publish(Change::Hanging {
            ktl,
            miltai,
            reason,
        });
    }
}

impl Section for HangingSection {
    fn name(&self) -> &'static str {
        "kabinimas"
    }

    fn boot(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch) -> bool {
        // pages without the hanging template skip the section silently
        let any_target = [KTL_STATUS, KTL_BLOCK, MILTAI_STATUS, MILTAI_BLOCK]
            .iter()
            .any(|id| doc.exists(id));
        if !any_target {
            return false;
        }
        if !doc.exists(KTL) && !doc.exists(MILTAI) {
            return false;
        }
        self.sync(doc, ctx, "init");
        true
    }

    fn routes(&self, _doc: &dyn Surface) -> Vec<Route> {
        vec![
            Route::new(Trigger::Change, Matcher::Id(KTL.into())),
            Route::new(Trigger::Change, Matcher::Id(MILTAI.into())),
        ]
    }

    fn on_field(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch, _key: &str, _trigger: Trigger) {
        self.sync(doc, ctx, "change");
    }

    fn topics(&self) -> &'static [Topic] {
        &[Topic::Service]
    }

    fn on_change(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch, _change: &Change) {
        self.sync(doc, ctx, "bus");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingRegistry;
    use crate::bus::EventBus;
    use crate::document::{Document, Node};

    fn hanging_doc() -> Document {
        let mut doc = Document::new();
        doc.push_node(Node::checkbox(KTL)).unwrap();
        doc.push_node(Node::checkbox(MILTAI)).unwrap();
        doc.push_node(Node::output(KTL_STATUS)).unwrap();
        doc.push_node(Node::container(KTL_BLOCK)).unwrap();
        doc.push_node(Node::output(MILTAI_STATUS)).unwrap();
        doc.push_node(Node::container(MILTAI_BLOCK)).unwrap();
        doc
    }

    #[test]
    fn test_status_and_visibility_follow_drivers() {
        let mut doc = hanging_doc();
        doc.set_checked(KTL, true);
        let mut bus = EventBus::new();
        let mut registry = BindingRegistry::new();
        let mut section = HangingSection::default();
        {
            let mut ctx = Dispatch {
                bus: &mut bus,
                registry: &mut registry,
            };
            section.sync(&mut doc, &mut ctx, "change");
        }
        assert_eq!(doc.value(KTL_STATUS).unwrap(), STATUS_ON);
        assert!(doc.is_visible(KTL_BLOCK));
        assert_eq!(doc.value(MILTAI_STATUS).unwrap(), DASH);
        assert!(!doc.is_visible(MILTAI_BLOCK));
    }

    #[test]
    fn test_unchanged_state_is_not_republished() {
        let mut doc = hanging_doc();
        doc.set_checked(MILTAI, true);
        let mut bus = EventBus::new();
        let mut registry = BindingRegistry::new();
        let mut section = HangingSection::default();
        {
            let mut ctx = Dispatch {
                bus: &mut bus,
                registry: &mut registry,
            };
            section.sync(&mut doc, &mut ctx, "change");
            section.sync(&mut doc, &mut ctx, "bus");
        }
        assert_eq!(bus.pending(), 1);
        assert_eq!(
            bus.pop().unwrap(),
            Change::Hanging {
                ktl: false,
                miltai: true,
                reason: "change",
            }
        );
    }

    #[test]
    fn test_missing_template_skips_section() {
        let mut doc = Document::new();
        doc.push_node(Node::checkbox(KTL)).unwrap();
        let mut bus = EventBus::new();
        let mut registry = BindingRegistry::new();
        let mut section = HangingSection::default();
        let active = {
            let mut ctx = Dispatch {
                bus: &mut bus,
                registry: &mut registry,
            };
            section.boot(&mut doc, &mut ctx)
        };
        assert!(!active);
        assert_eq!(bus.pending(), 0);
    }
}
