//! Overall X/Y/Z dimension label.
//!
//! Renders `X×Y×Z mm` into the read-only dimensions preview on every
//! keystroke, a dash standing in for each missing part. The raw field
//! text goes into the label as typed — this preview reflects what the
//! operator entered, not a normalized number.

use crate::bus::Change;
use crate::document::Surface;
use crate::engine::{Dispatch, Matcher, Route, Section, Trigger};
use crate::rules::DASH;

const X: &str = "id_x_mm";
const Y: &str = "id_y_mm";
const Z: &str = "id_z_mm";
const PREVIEW: &str = "matmenys-xyz-preview";

/// The dimensions section.
#[derive(Debug, Default)]
pub struct DimensionsSection;

impl DimensionsSection {
    fn sync(&self, doc: &mut dyn Surface, ctx: &mut Dispatch, reason: &'static str) {
        let raw_x = doc.value(X).unwrap_or_default();
        let raw_y = doc.value(Y).unwrap_or_default();
        let raw_z = doc.value(Z).unwrap_or_default();

        let part = |raw: &str| {
            let v = raw.trim();
            if v.is_empty() { DASH.to_string() } else { v.to_string() }
        };
        let (x, y, z) = (part(&raw_x), part(&raw_y), part(&raw_z));
        let label = if x == DASH && y == DASH && z == DASH {
            DASH.to_string()
        } else {
            format!("{x}×{y}×{z} mm")
        };
        doc.set_value(PREVIEW, &label);

        ctx.publish(Change::Dimensions {
            x: raw_x,
            y: raw_y,
            z: raw_z,
            reason,
        });
    }
}

impl Section for DimensionsSection {
    fn name(&self) -> &'static str {
        "xyz"
    }

    fn boot(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch) -> bool {
        if !doc.exists(PREVIEW) {
            return false;
        }
        self.sync(doc, ctx, "init");
        true
    }

    fn routes(&self, _doc: &dyn Surface) -> Vec<Route> {
        [X, Y, Z]
            .into_iter()
            .map(|id| Route::new(Trigger::Input, Matcher::Id(id.into())))
            .collect()
    }

    fn on_field(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch, _key: &str, _trigger: Trigger) {
        self.sync(doc, ctx, "input");
    }
}
