//! Masking group rules: row add/remove plus the empty-group coupling.
//!
//! The masking blocks are repeatable row groups (one per coating). On
//! top of the generic row-group manager this section layers the
//! masking-specific constraint: the items container is visible iff any
//! row is visible, and a group that loses its last visible row flips
//! its parent type selector back to the "none" state. Both are pure
//! functions of current row state, recomputed on every
//! `maskavimas:changed`.

use crate::bus::{Change, Topic};
use crate::document::{GroupKind, Surface};
use crate::engine::{Dispatch, Matcher, Route, Section, Trigger};
use crate::formset;

/// The type selector's "none" choice value.
const TYPE_NONE: &str = "nera";

/// The masking blocks section.
#[derive(Debug, Default)]
pub struct MaskingSection {
    prefixes: Vec<String>,
}

impl MaskingSection {
    /// Container visibility and the empty-group selector flip, as a
    /// pure function of the group's current rows.
    fn sync_group(&self, doc: &mut dyn Surface, prefix: &str) {
        let Some(group) = doc.group(prefix) else { return };
        let any_visible = !formset::visible_rows(doc, prefix).is_empty();
        doc.set_visible(&group.container, any_visible);
        if !any_visible
            && let Some(selector) = &group.type_selector
        {
            doc.set_value(selector, TYPE_NONE);
        }
    }
}

impl Section for MaskingSection {
    fn name(&self) -> &'static str {
        "maskavimas"
    }

    fn boot(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch) -> bool {
        for group in doc.groups() {
            if group.kind != GroupKind::Masking {
                continue;
            }
            // items container and total-count field are required; the
            // add button and template are optional on read-only pages
            if !doc.exists(&group.container)
                || !doc.exists(&crate::document::total_forms_name(&group.prefix))
            {
                continue;
            }

            for row in doc.rows(&group.prefix) {
                formset::bind_row(doc, ctx.registry, &group.prefix, &row);
            }
            self.sync_group(doc, &group.prefix);
            let count = formset::visible_rows(doc, &group.prefix).len();
            ctx.publish(Change::Masking {
                prefix: group.prefix.clone(),
                count,
                reason: "init",
            });
            self.prefixes.push(group.prefix);
        }
        !self.prefixes.is_empty()
    }

    fn routes(&self, doc: &dyn Surface) -> Vec<Route> {
        let mut routes = Vec::new();
        for prefix in &self.prefixes {
            if let Some(group) = doc.group(prefix)
                && let Some(add_button) = group.add_button
            {
                routes.push(Route::new(Trigger::Click, Matcher::Id(add_button)));
            }
            routes.push(Route::new(
                Trigger::Click,
                Matcher::GroupSuffix {
                    prefix: prefix.clone(),
                    suffix: "-remove",
                },
            ));
        }
        routes
    }

    fn on_field(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch, key: &str, _trigger: Trigger) {
        // add button?
        let id = doc.id_of(key);
        for prefix in &self.prefixes {
            let Some(group) = doc.group(prefix) else { continue };
            if group.add_button.is_some() && group.add_button == id {
                if let Err(e) = formset::add_row(&mut *doc, ctx.bus, ctx.registry, prefix) {
                    tracing::warn!(prefix = %prefix, error = %e, "add-row aborted");
                }
                return;
            }
        }

        // otherwise a row's remove button
        let Some(prefix) = doc.group_of(key) else { return };
        let Some(row) = doc.row_of(key) else { return };
        formset::remove_row(doc, ctx.bus, &prefix, row);
    }

    fn topics(&self) -> &'static [Topic] {
        &[Topic::Masking]
    }

    fn on_change(&mut self, doc: &mut dyn Surface, _ctx: &mut Dispatch, change: &Change) {
        if let Change::Masking { prefix, .. } = change
            && self.prefixes.contains(prefix)
        {
            self.sync_group(doc, prefix);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BindingRegistry;
    use crate::bus::EventBus;
    use crate::document::{Document, Group, Node, RowTemplate};

    fn masking_doc() -> Document {
        let mut doc = Document::new();
        doc.push_node(
            Node::hidden("id_maskavimas_ktl-TOTAL_FORMS")
                .named("maskavimas_ktl-TOTAL_FORMS")
                .with_value("0"),
        )
        .unwrap();
        doc.push_node(Node::container("maskavimas_ktl-items")).unwrap();
        doc.push_node(Node::button("maskavimas_ktl-add")).unwrap();
        doc.push_node(Node::select("id_maskavimo_tipas_ktl").with_value("yra"))
            .unwrap();
        doc.push_group(
            Group::new("maskavimas_ktl", GroupKind::Masking, "maskavimas_ktl-items")
                .with_add_button("maskavimas_ktl-add")
                .with_type_selector("id_maskavimo_tipas_ktl")
                .with_template(RowTemplate {
                    row: "maskavimas_ktl-__prefix__-item".into(),
                    fields: vec![
                        Node::text_input("id_maskavimas_ktl-__prefix__-maskuote")
                            .named("maskavimas_ktl-__prefix__-maskuote"),
                        Node::text_input("id_maskavimas_ktl-__prefix__-vietu_kiekis")
                            .named("maskavimas_ktl-__prefix__-vietu_kiekis")
                            .with_decimals(0),
                        Node::checkbox("id_maskavimas_ktl-__prefix__-DELETE")
                            .named("maskavimas_ktl-__prefix__-DELETE"),
                        Node::button("maskavimas_ktl-__prefix__-remove"),
                    ],
                }),
        )
        .unwrap();
        doc
    }

    struct Bench {
        doc: Document,
        bus: EventBus,
        registry: BindingRegistry,
        section: MaskingSection,
    }

    fn boot() -> Bench {
        let mut bench = Bench {
            doc: masking_doc(),
            bus: EventBus::new(),
            registry: BindingRegistry::new(),
            section: MaskingSection::default(),
        };
        let mut ctx = Dispatch {
            bus: &mut bench.bus,
            registry: &mut bench.registry,
        };
        assert!(bench.section.boot(&mut bench.doc, &mut ctx));
        bench
    }

    fn pump(bench: &mut Bench) {
        while let Some(change) = bench.bus.pop() {
            let mut ctx = Dispatch {
                bus: &mut bench.bus,
                registry: &mut bench.registry,
            };
            bench.section.on_change(&mut bench.doc, &mut ctx, &change);
        }
    }

    #[test]
    fn test_empty_group_starts_hidden() {
        let mut bench = boot();
        pump(&mut bench);
        assert!(!bench.doc.is_visible("maskavimas_ktl-items"));
    }

    #[test]
    fn test_add_row_shows_container() {
        let mut bench = boot();
        pump(&mut bench);
        {
            let mut ctx = Dispatch {
                bus: &mut bench.bus,
                registry: &mut bench.registry,
            };
            bench
                .section
                .on_field(&mut bench.doc, &mut ctx, "maskavimas_ktl-add", Trigger::Click);
        }
        pump(&mut bench);
        assert!(bench.doc.is_visible("maskavimas_ktl-items"));
        assert!(bench.doc.exists("maskavimas_ktl-0-maskuote"));
        assert_eq!(formset::total_count(&bench.doc, "maskavimas_ktl"), 1);
    }

    #[test]
    fn test_removing_last_row_flips_selector_to_none() {
        let mut bench = boot();
        {
            let mut ctx = Dispatch {
                bus: &mut bench.bus,
                registry: &mut bench.registry,
            };
            bench
                .section
                .on_field(&mut bench.doc, &mut ctx, "maskavimas_ktl-add", Trigger::Click);
        }
        pump(&mut bench);
        bench.doc.set_value("id_maskavimo_tipas_ktl", "yra");

        {
            let mut ctx = Dispatch {
                bus: &mut bench.bus,
                registry: &mut bench.registry,
            };
            bench.section.on_field(
                &mut bench.doc,
                &mut ctx,
                "maskavimas_ktl-0-remove",
                Trigger::Click,
            );
        }
        pump(&mut bench);

        assert!(bench.doc.is_checked("maskavimas_ktl-0-DELETE"));
        assert!(!bench.doc.is_visible("maskavimas_ktl-0-item"));
        assert!(!bench.doc.is_visible("maskavimas_ktl-items"));
        assert_eq!(
            bench.doc.value("id_maskavimo_tipas_ktl").unwrap(),
            TYPE_NONE
        );
        // the slot itself survives for the server contract
        assert_eq!(formset::total_count(&bench.doc, "maskavimas_ktl"), 1);
    }
}
