//! # Row-Group Manager
//!
//! Generic operations on repeatable row groups (formsets): template
//! instantiation, placeholder consumption, total-count maintenance,
//! soft deletion.
//!
//! The server contract is strict: the hidden `<prefix>-TOTAL_FORMS`
//! field must always equal the number of row slots ever created in
//! the group, deleted or not. Rows are therefore never structurally
//! removed — deletion sets the row's `-DELETE` field and hides the
//! row. The single exception is an unsubmitted placeholder row, which
//! is consumed when the first real row arrives.
//!
//! Group-specific coupling (a masking group flipping its parent type
//! selector when it empties) lives in the rules layer, not here.

use crate::binding::BindingRegistry;
use crate::bus::{Change, EventBus};
use crate::document::{
    delete_field_name, total_forms_name, GroupKind, NewRow, NodeKind, RowInfo, RowTemplate, Surface,
};
use crate::engine::{Dispatch, Matcher, Route, Section, Trigger};
use crate::error::PozformError;

/// Literal placeholder token replaced with the new row's ordinal
/// index at creation time.
pub const PREFIX_TOKEN: &str = "__prefix__";

fn substitute(s: &str, index: usize) -> String {
    s.replace(PREFIX_TOKEN, &index.to_string())
}

/// Instantiate a row template: clone the fields and replace the
/// placeholder token, verbatim and globally, in the row id and every
/// field's id, name and value.
pub fn instantiate(template: &RowTemplate, index: usize) -> NewRow {
    let fields = template
        .fields
        .iter()
        .map(|tpl| {
            let mut field = tpl.clone();
            field.id = substitute(&tpl.id, index);
            field.name = tpl.name.as_deref().map(|n| substitute(n, index));
            field.value = substitute(&tpl.value, index);
            field
        })
        .collect();
    NewRow {
        index,
        node: substitute(&template.row, index),
        fields,
    }
}

/// Current total-count value of a group, defaulting to 0.
pub fn total_count(doc: &dyn Surface, prefix: &str) -> usize {
    doc.value(&total_forms_name(prefix))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Rows that are real (not placeholders) and currently shown.
pub fn visible_rows(doc: &dyn Surface, prefix: &str) -> Vec<RowInfo> {
    doc.rows(prefix)
        .into_iter()
        .filter(|r| !r.placeholder && doc.is_visible(&r.node))
        .collect()
}

/// One-time setup for a row: claim its init marker and the decimal
/// binding of each precision-declaring field. Safe to call again —
/// an already-bound row is a no-op.
pub fn bind_row(
    doc: &dyn Surface,
    registry: &mut BindingRegistry,
    prefix: &str,
    row: &RowInfo,
) -> bool {
    if !registry.claim(&row.node, "row-init") {
        return false;
    }
    for field in doc.row_fields(prefix, row.index) {
        if doc.decimals(&field).is_some() {
            registry.claim(&field, "decimal");
        }
    }
    true
}

fn group_changed(doc: &dyn Surface, kind: GroupKind, prefix: &str, reason: &'static str) -> Change {
    match kind {
        GroupKind::Pricing => Change::Pricing {
            prefix: Some(prefix.to_string()),
            reason,
        },
        GroupKind::Masking => Change::Masking {
            prefix: prefix.to_string(),
            count: visible_rows(doc, prefix).len(),
            reason,
        },
    }
}

/// Add a row to a group.
///
/// Consumes any unsubmitted placeholder row, instantiates the template
/// at the current total-count index, appends the row, bumps the
/// total-count, runs one-time field setup, and publishes the group's
/// change event with reason `add-row`.
///
/// A missing or row-less template aborts before anything is mutated;
/// the total-count field is never touched on failure.
pub fn add_row(
    doc: &mut dyn Surface,
    bus: &mut EventBus,
    registry: &mut BindingRegistry,
    prefix: &str,
) -> Result<usize, PozformError> {
    let group = doc
        .group(prefix)
        .ok_or_else(|| PozformError::UnknownGroup(prefix.to_string()))?;
    let template = doc
        .template(prefix)
        .ok_or_else(|| PozformError::TemplateMissing(prefix.to_string()))?;
    if template.row.trim().is_empty() {
        return Err(PozformError::TemplateEmpty(prefix.to_string()));
    }
    let total_field = total_forms_name(prefix);
    if !doc.exists(&total_field) {
        return Err(PozformError::MissingNode(total_field));
    }

    doc.consume_placeholder(prefix);

    let index = total_count(doc, prefix);
    let new_row = instantiate(&template, index);
    let row_node = new_row.node.clone();
    doc.push_row(prefix, new_row)?;
    doc.set_value(&total_field, &(index + 1).to_string());

    bind_row(
        doc,
        registry,
        prefix,
        &RowInfo {
            index,
            node: row_node,
            placeholder: false,
        },
    );

    bus.publish(group_changed(doc, group.kind, prefix, "add-row"));
    Ok(index)
}

/// Soft-delete a row: set its deletion flag, hide it, publish the
/// group's change event with reason `remove-row`. The row stays in
/// the document so the already-rendered total-count keeps matching
/// the server's positional expectations.
pub fn remove_row(
    doc: &mut dyn Surface,
    bus: &mut EventBus,
    prefix: &str,
    index: usize,
) -> bool {
    let Some(group) = doc.group(prefix) else {
        return false;
    };
    let Some(row) = doc.rows(prefix).into_iter().find(|r| r.index == index) else {
        return false;
    };

    let delete_field = delete_field_name(prefix, index);
    if doc.kind(&delete_field) == Some(NodeKind::Checkbox) {
        doc.set_checked(&delete_field, true);
    } else {
        // some templates render the flag as a hidden input
        doc.set_value(&delete_field, "on");
    }
    doc.set_visible(&row.node, false);

    bus.publish(group_changed(doc, group.kind, prefix, "remove-row"));
    true
}

/// Row fields whose keystrokes mean "the price picture changed".
const INPUT_SUFFIXES: [&str; 5] = [
    "-kaina",
    "-busena_ui",
    "-pastaba",
    "-kiekis_nuo",
    "-kiekis_iki",
];

/// Row fields whose committed changes mean the same.
const CHANGE_SUFFIXES: [&str; 5] = [
    "-DELETE",
    "-busena_ui",
    "-galioja_nuo",
    "-galioja_iki",
    "-matas",
];

/// The price formsets section: binds every pricing group on the page,
/// owns its add-row button, and forwards row-field edits to the
/// pricing channel.
#[derive(Debug, Default)]
pub struct PricingSection {
    prefixes: Vec<String>,
}

impl Section for PricingSection {
    fn name(&self) -> &'static str {
        "kainos"
    }

    fn boot(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch) -> bool {
        for group in doc.groups() {
            if group.kind != GroupKind::Pricing {
                continue;
            }
            // the full formset chrome is required; a page that renders
            // only part of it gets no binding at all
            let complete = doc.exists(&group.container)
                && group.add_button.as_deref().is_some_and(|id| doc.exists(id))
                && doc.exists(&total_forms_name(&group.prefix))
                && group.has_template;
            if !complete {
                continue;
            }

            for row in doc.rows(&group.prefix) {
                bind_row(doc, ctx.registry, &group.prefix, &row);
            }
            ctx.publish(Change::Pricing {
                prefix: Some(group.prefix.clone()),
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
            for suffix in INPUT_SUFFIXES {
                routes.push(Route::new(
                    Trigger::Input,
                    Matcher::GroupSuffix {
                        prefix: prefix.clone(),
                        suffix,
                    },
                ));
            }
            for suffix in CHANGE_SUFFIXES {
                routes.push(Route::new(
                    Trigger::Change,
                    Matcher::GroupSuffix {
                        prefix: prefix.clone(),
                        suffix,
                    },
                ));
            }
        }
        routes
    }

    fn on_field(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch, key: &str, trigger: Trigger) {
        match trigger {
            Trigger::Click => {
                let id = doc.id_of(key);
                for prefix in &self.prefixes {
                    let is_add = doc
                        .group(prefix)
                        .is_some_and(|g| g.add_button.is_some() && g.add_button == id);
                    if is_add {
                        if let Err(e) = add_row(&mut *doc, ctx.bus, ctx.registry, prefix) {
                            tracing::warn!(prefix = %prefix, error = %e, "add-row aborted");
                        }
                        return;
                    }
                }
            }
            Trigger::Input => {
                ctx.publish(Change::Pricing {
                    prefix: doc.group_of(key),
                    reason: "input",
                });
            }
            Trigger::Change => {
                ctx.publish(Change::Pricing {
                    prefix: doc.group_of(key),
                    reason: "change",
                });
            }
            Trigger::Blur => {}
        }
    }
}
