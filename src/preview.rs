//! # Price Preview
//!
//! Derives the read-only "current price" summary from the price row
//! group. Selection is deterministic, single-winner: skip rows
//! flagged deleted, skip rows whose status is not the active
//! enumeration value, and among the remaining take the first (in
//! document order) with a non-empty amount. An empty amount is
//! skipped, not selected-as-empty. No qualifying row means no price —
//! rendered as a dash, not zero, not an error.
//!
//! The preview re-renders on every `kainos:changed` and at boot.

use crate::bus::{Change, Topic};
use crate::decimal;
use crate::document::{GroupKind, Surface, delete_field_name};
use crate::engine::{Dispatch, Route, Section, Trigger};
use crate::rules::DASH;

const PREVIEW_BOX: &str = "kaina-eur-preview";

/// Declared precision of price fields.
const PRICE_DECIMALS: u8 = 4;

/// The active choice value of the per-row status select.
const STATUS_ACTIVE: &str = "aktuali";

/// Deterministic single-winner price selection over a group's rows.
///
/// Returns the winning row's raw amount text; formatting is the
/// renderer's business.
pub fn select_active_price(doc: &dyn Surface, prefix: &str) -> Option<String> {
    for row in doc.rows(prefix) {
        if row.placeholder {
            continue;
        }
        if doc.is_checked(&delete_field_name(prefix, row.index)) {
            continue;
        }

        let status_field = format!("{prefix}-{}-busena_ui", row.index);
        if let Some(status) = doc.value(&status_field)
            && !status.trim().eq_ignore_ascii_case(STATUS_ACTIVE)
        {
            continue;
        }

        let amount_field = format!("{prefix}-{}-kaina", row.index);
        let amount = doc.value(&amount_field).unwrap_or_default();
        let amount = amount.trim();
        if amount.is_empty() {
            continue;
        }
        return Some(amount.to_string());
    }
    None
}

/// The price preview section.
#[derive(Debug, Default)]
pub struct PricePreviewSection;

impl PricePreviewSection {
    fn render(&self, doc: &mut dyn Surface) {
        let Some(group) = doc
            .groups()
            .into_iter()
            .find(|g| g.kind == GroupKind::Pricing)
        else {
            return;
        };

        let label = match select_active_price(doc, &group.prefix) {
            Some(raw) => {
                // best effort: show the canonical form when the text
                // parses, the raw text when it doesn't
                let shown = decimal::normalize(&raw, Some(PRICE_DECIMALS));
                format!("{shown} €")
            }
            None => DASH.to_string(),
        };
        doc.set_value(PREVIEW_BOX, &label);
    }
}

impl Section for PricePreviewSection {
    fn name(&self) -> &'static str {
        "kainos-preview"
    }

    fn boot(&mut self, doc: &mut dyn Surface, _ctx: &mut Dispatch) -> bool {
        if !doc.exists(PREVIEW_BOX) {
            return false;
        }
        self.render(doc);
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
        &[Topic::Pricing]
    }

    fn on_change(&mut self, doc: &mut dyn Surface, _ctx: &mut Dispatch, _change: &Change) {
        self.render(doc);
    }
}
