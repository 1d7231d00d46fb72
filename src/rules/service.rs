//! Service block rules: KTL / powder coating / preparation.
//!
//! The preparation checkbox is a conditional-required ratchet: turning
//! on either coating driver forces preparation on and locks it against
//! manual uncheck; turning both drivers off unlocks it but leaves it
//! checked. Presets for the preparation and coating text fields are
//! empty-only. Sub-block visibility is a pure function of the two
//! drivers. The KTL geometry preview derives length × height × depth
//! into a read-only volume field.
//!
//! The block publishes a single `paslauga:changed` per logical action.

use crate::bus::Change;
use crate::decimal;
use crate::document::Surface;
use crate::engine::{Dispatch, Matcher, Route, Section, Trigger};
use crate::rules::{DASH, set_if_empty};

const KTL: &str = "id_paslauga_ktl";
const MILTAI: &str = "id_paslauga_miltai";
const PARUOSIMAS: &str = "id_paslauga_paruosimas";

const PREP_TEXT: &str = "id_paruosimas";
const COATING_TEXT: &str = "id_padengimas";

const KTL_BOX: &str = "ktl-subblock";
const MILTAI_BOX: &str = "miltai-subblock";

const DIM_LENGTH: &str = "id_ktl_ilgis_mm";
const DIM_HEIGHT: &str = "id_ktl_aukstis_mm";
const DIM_DEPTH: &str = "id_ktl_gylis_mm";
const VOLUME_OUT: &str = "ktl-sandauga-preview";

/// Default preparation agent, applied while no coating is selected.
const PREP_PRESET: &str = "Gardobond 24T";
/// Default KTL coating.
const KTL_COATING_PRESET: &str = "KTL BASF CG 570";

/// The service block section.
#[derive(Debug, Default)]
pub struct ServiceSection;

impl ServiceSection {
    fn sync(
        &self,
        doc: &mut dyn Surface,
        ctx: &mut Dispatch,
        reason: &'static str,
        source: Option<&'static str>,
    ) {
        let ktl = doc.is_checked(KTL);
        let miltai = doc.is_checked(MILTAI);

        // ratchet: force preparation on while any driver is on; when
        // all drivers drop, unlock but leave the current state alone
        if ktl || miltai {
            doc.set_checked(PARUOSIMAS, true);
            doc.set_enabled(PARUOSIMAS, false);
        } else {
            doc.set_enabled(PARUOSIMAS, true);
        }

        // empty-only presets
        if doc.is_checked(PARUOSIMAS) && !ktl && !miltai {
            set_if_empty(doc, PREP_TEXT, PREP_PRESET);
        }
        if ktl {
            set_if_empty(doc, COATING_TEXT, KTL_COATING_PRESET);
        }

        doc.set_visible(KTL_BOX, ktl);
        doc.set_visible(MILTAI_BOX, miltai);

        sync_volume(doc);

        ctx.publish(Change::Service {
            ktl,
            miltai,
            paruosimas: doc.is_checked(PARUOSIMAS),
            reason,
            source,
        });
    }
}

/// Recompute the KTL volume preview from the three dimension fields.
///
/// Any unparseable dimension blanks the preview to a dash — never a
/// stale or partial number.
fn sync_volume(doc: &mut dyn Surface) {
    if !doc.exists(VOLUME_OUT) {
        return;
    }
    let dims = [DIM_LENGTH, DIM_HEIGHT, DIM_DEPTH]
        .map(|key| doc.value(key).as_deref().and_then(decimal::parse));

    let label = match dims {
        [Some(a), Some(b), Some(c)] => {
            let product = a * b * c;
            if product.is_finite() {
                format!("{product:.1} mm³")
            } else {
                DASH.to_string()
            }
        }
        _ => DASH.to_string(),
    };
    doc.set_value(VOLUME_OUT, &label);
}

impl Section for ServiceSection {
    fn name(&self) -> &'static str {
        "paslauga"
    }

    fn boot(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch) -> bool {
        if !doc.exists(KTL) || !doc.exists(MILTAI) || !doc.exists(PARUOSIMAS) {
            return false;
        }
        self.sync(doc, ctx, "init", None);
        true
    }

    fn routes(&self, _doc: &dyn Surface) -> Vec<Route> {
        let mut routes = vec![
            Route::new(Trigger::Change, Matcher::Id(KTL.into())),
            Route::new(Trigger::Change, Matcher::Id(MILTAI.into())),
            Route::new(Trigger::Change, Matcher::Id(PARUOSIMAS.into())),
        ];
        for dim in [DIM_LENGTH, DIM_HEIGHT, DIM_DEPTH] {
            for trigger in [Trigger::Input, Trigger::Change, Trigger::Blur] {
                routes.push(Route::new(trigger, Matcher::Id(dim.into())));
            }
        }
        routes
    }

    fn on_field(&mut self, doc: &mut dyn Surface, ctx: &mut Dispatch, key: &str, _trigger: Trigger) {
        let Some(id) = doc.id_of(key) else { return };
        match id.as_str() {
            KTL => self.sync(doc, ctx, "change", Some("ktl")),
            MILTAI => self.sync(doc, ctx, "change", Some("miltai")),
            PARUOSIMAS => self.sync(doc, ctx, "change", Some("paruosimas")),
            // dimension edits only refresh the derived preview; they
            // are not a service state change
            DIM_LENGTH | DIM_HEIGHT | DIM_DEPTH => sync_volume(doc),
            _ => {}
        }
    }
}
