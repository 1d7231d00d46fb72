//! # Engine Integration Tests
//!
//! Drives the public API end to end over the built-in sample order
//! form: boot idempotence, the preparation ratchet, empty-only
//! presets, the row-count invariant, deterministic price selection,
//! the geometry preview, and visibility purity.

use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

use pozform::{Change, Engine, Surface, sample};

/// Engine over the sample form with an all-topic event log attached.
fn booted_engine() -> (Engine, Rc<RefCell<Vec<Change>>>) {
    let mut engine = Engine::new(sample::order_form());
    let log: Rc<RefCell<Vec<Change>>> = Rc::new(RefCell::new(Vec::new()));
    {
        let log = Rc::clone(&log);
        engine.subscribe_all(Box::new(move |change| {
            log.borrow_mut().push(change.clone());
            Ok(())
        }));
    }
    engine.boot();
    (engine, log)
}

fn events_named<'a>(log: &'a [Change], name: &str) -> Vec<&'a Change> {
    log.iter().filter(|c| c.name() == name).collect()
}

// ====================================================================
// BOOT IDEMPOTENCE
// ====================================================================

#[test]
fn test_double_boot_binds_once_and_inits_once() {
    let (mut engine, log) = booted_engine();

    let bindings_after_first = engine.registry().len();
    let events_after_first = log.borrow().len();

    engine.boot();

    assert_eq!(engine.registry().len(), bindings_after_first);
    assert_eq!(log.borrow().len(), events_after_first);

    // exactly one init per section; the two masking groups each
    // announce themselves
    let log = log.borrow();
    let inits: Vec<&Change> = log.iter().filter(|c| c.reason() == "init").collect();
    assert_eq!(
        inits.iter().filter(|c| c.name() == "paslauga:changed").count(),
        1
    );
    assert_eq!(
        inits.iter().filter(|c| c.name() == "kabinimas:changed").count(),
        1
    );
    assert_eq!(
        inits.iter().filter(|c| c.name() == "papildomos:changed").count(),
        1
    );
    assert_eq!(inits.iter().filter(|c| c.name() == "xyz:changed").count(), 1);
    assert_eq!(
        inits.iter().filter(|c| c.name() == "kainos:changed").count(),
        1
    );
    assert_eq!(
        inits.iter().filter(|c| c.name() == "maskavimas:changed").count(),
        2
    );
}

#[test]
fn test_one_toggle_reaches_a_fixed_point_in_one_pass() {
    let (mut engine, log) = booted_engine();
    log.borrow_mut().clear();

    engine.toggle("id_paslauga_ktl", true);

    // the toggle settles in exactly one service event and one hanging
    // event — no republish storm
    let log = log.borrow();
    assert_eq!(events_named(&log, "paslauga:changed").len(), 1);
    assert_eq!(events_named(&log, "kabinimas:changed").len(), 1);
    assert_eq!(log.len(), 2);
}

// ====================================================================
// CONDITIONAL-REQUIRED RATCHET
// ====================================================================

#[test]
fn test_preparation_ratchet() {
    let (mut engine, _) = booted_engine();

    // A=off, B=off, dependent=off
    assert!(!engine.doc().is_checked("id_paslauga_paruosimas"));

    // A=on forces the dependent on and disables manual uncheck
    engine.toggle("id_paslauga_ktl", true);
    assert!(engine.doc().is_checked("id_paslauga_paruosimas"));
    assert!(!engine.toggle("id_paslauga_paruosimas", false));
    assert!(engine.doc().is_checked("id_paslauga_paruosimas"));

    // A=off re-enables manual uncheck but leaves it checked
    engine.toggle("id_paslauga_ktl", false);
    assert!(engine.doc().is_checked("id_paslauga_paruosimas"));
    assert!(engine.doc().is_enabled("id_paslauga_paruosimas"));
    assert!(engine.toggle("id_paslauga_paruosimas", false));
    assert!(!engine.doc().is_checked("id_paslauga_paruosimas"));
}

// ====================================================================
// EMPTY-ONLY PRESETS
// ====================================================================

#[test]
fn test_coating_preset_applies_only_when_empty() {
    let (mut engine, _) = booted_engine();

    engine.toggle("id_paslauga_ktl", true);
    assert_eq!(engine.doc().value("id_padengimas").unwrap(), "KTL BASF CG 570");
}

#[test]
fn test_preset_never_overwrites_user_value() {
    let (mut engine, _) = booted_engine();

    engine.commit("id_padengimas", "Epoxy primer RAL 7035");
    engine.toggle("id_paslauga_ktl", true);
    engine.toggle("id_paslauga_ktl", false);
    engine.toggle("id_paslauga_ktl", true);

    assert_eq!(
        engine.doc().value("id_padengimas").unwrap(),
        "Epoxy primer RAL 7035"
    );
}

#[test]
fn test_preparation_preset_when_no_drivers() {
    let (mut engine, _) = booted_engine();

    engine.toggle("id_paslauga_paruosimas", true);
    assert_eq!(engine.doc().value("id_paruosimas").unwrap(), "Gardobond 24T");
}

// ====================================================================
// ROW-COUNT INVARIANT
// ====================================================================

#[test]
fn test_total_count_equals_rows_ever_instantiated() {
    let (mut engine, _) = booted_engine();

    for _ in 0..5 {
        engine.click("kainos-add-row-kainos");
    }
    assert_eq!(engine.doc().value("kainos-TOTAL_FORMS").unwrap(), "5");

    // soft-deleting rows must not move the total
    engine.toggle("kainos-1-DELETE", true);
    engine.toggle("kainos-3-DELETE", true);
    assert_eq!(engine.doc().value("kainos-TOTAL_FORMS").unwrap(), "5");
    assert_eq!(engine.doc().rows("kainos").len(), 5);
}

#[test]
fn test_masking_rows_survive_removal() {
    let (mut engine, _) = booted_engine();

    engine.click("maskavimas_ktl-add");
    engine.click("maskavimas_ktl-add");
    assert_eq!(engine.doc().value("maskavimas_ktl-TOTAL_FORMS").unwrap(), "2");

    engine.click("maskavimas_ktl-0-remove");
    assert_eq!(engine.doc().value("maskavimas_ktl-TOTAL_FORMS").unwrap(), "2");
    assert!(engine.doc().is_checked("maskavimas_ktl-0-DELETE"));
    assert!(!engine.doc().is_visible("maskavimas_ktl-0-item"));
    assert!(engine.doc().is_visible("maskavimas_ktl-items"));
}

#[test]
fn test_masking_empty_group_flips_type_selector() {
    let (mut engine, _) = booted_engine();

    engine.set_value("id_maskavimo_tipas_ktl", "yra");
    engine.click("maskavimas_ktl-add");
    assert!(engine.doc().is_visible("maskavimas_ktl-items"));

    engine.click("maskavimas_ktl-0-remove");
    assert!(!engine.doc().is_visible("maskavimas_ktl-items"));
    assert_eq!(engine.doc().value("id_maskavimo_tipas_ktl").unwrap(), "nera");
}

// ====================================================================
// DETERMINISTIC PRICE SELECTION
// ====================================================================

#[test]
fn test_price_preview_skips_inactive_and_empty_rows() {
    let (mut engine, _) = booted_engine();

    for _ in 0..3 {
        engine.click("kainos-add-row-kainos");
    }
    engine.choose("kainos-0-busena_ui", "neaktuali");
    engine.commit("kainos-0-kaina", "5");
    // row 1 stays active with an empty price: skipped, not selected
    engine.commit("kainos-2-kaina", "12.5");

    assert_eq!(
        pozform::preview::select_active_price(engine.doc(), "kainos").as_deref(),
        Some("12.5000")
    );
    assert_eq!(engine.doc().value("kaina-eur-preview").unwrap(), "12.5000 €");
}

#[test]
fn test_price_preview_dash_without_price() {
    let (mut engine, _) = booted_engine();
    assert_eq!(engine.doc().value("kaina-eur-preview").unwrap(), "—");

    engine.click("kainos-add-row-kainos");
    assert_eq!(engine.doc().value("kaina-eur-preview").unwrap(), "—");
}

#[test]
fn test_comma_price_normalizes_on_blur() {
    let (mut engine, _) = booted_engine();

    engine.click("kainos-add-row-kainos");
    engine.type_into("kainos-0-kaina", "1234,5");
    // keystroke pass only rewrites the comma
    assert_eq!(engine.doc().value("kainos-0-kaina").unwrap(), "1234.5");

    engine.blur("kainos-0-kaina");
    assert_eq!(engine.doc().value("kainos-0-kaina").unwrap(), "1234.5000");
    assert_eq!(engine.doc().value("kaina-eur-preview").unwrap(), "1234.5000 €");
}

// ====================================================================
// GEOMETRY PREVIEW
// ====================================================================

#[test]
fn test_volume_preview_dash_then_value() {
    let (mut engine, _) = booted_engine();

    engine.commit("id_ktl_ilgis_mm", "10");
    engine.commit("id_ktl_aukstis_mm", "20");
    assert_eq!(engine.doc().value("ktl-sandauga-preview").unwrap(), "—");

    engine.commit("id_ktl_gylis_mm", "5,5");
    assert_eq!(
        engine.doc().value("ktl-sandauga-preview").unwrap(),
        "1100.0 mm³"
    );
}

#[test]
fn test_dimension_label_follows_keystrokes() {
    let (mut engine, _) = booted_engine();
    assert_eq!(engine.doc().value("matmenys-xyz-preview").unwrap(), "—");

    engine.type_into("id_x_mm", "120");
    engine.type_into("id_z_mm", "45.5");
    assert_eq!(
        engine.doc().value("matmenys-xyz-preview").unwrap(),
        "120×—×45.5 mm"
    );
}

// ====================================================================
// VISIBILITY PURITY
// ====================================================================

#[test]
fn test_visibility_depends_only_on_final_state() {
    let (mut engine, _) = booted_engine();

    // a long path of toggles ending at ktl=on, miltai=off
    for (ktl, miltai) in [(true, true), (false, true), (false, false), (true, false)] {
        engine.toggle("id_paslauga_ktl", ktl);
        engine.toggle("id_paslauga_miltai", miltai);
    }

    assert!(engine.doc().is_visible("ktl-subblock"));
    assert!(!engine.doc().is_visible("miltai-subblock"));
    assert!(engine.doc().is_visible("ktl-kabinimas-subblock"));
    assert!(!engine.doc().is_visible("miltai-kabinimas-subblock"));
    assert_eq!(engine.doc().value("ktl-kabinimas-status").unwrap(), "Įjungta");
    assert_eq!(engine.doc().value("miltai-kabinimas-status").unwrap(), "—");
}

#[test]
fn test_extras_visibility_follows_select() {
    let (mut engine, _) = booted_engine();
    assert!(!engine.doc().is_visible("papildomos-paslaugos-aprasymas-row"));

    engine.choose("id_papildomos_paslaugos", "taip");
    assert!(engine.doc().is_visible("papildomos-paslaugos-aprasymas-row"));

    engine.type_into("id_papildomos_paslaugos_aprasymas", "shot blasting");
    engine.choose("id_papildomos_paslaugos", "ne");
    assert!(!engine.doc().is_visible("papildomos-paslaugos-aprasymas-row"));
    // hidden text is preserved, never cleared
    assert_eq!(
        engine.doc().value("id_papildomos_paslaugos_aprasymas").unwrap(),
        "shot blasting"
    );
}
