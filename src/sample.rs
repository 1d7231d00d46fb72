//! # Built-in Sample Order Form
//!
//! A complete position form document exercising every engine section:
//! the service block with its sub-blocks and KTL geometry, the hanging
//! block, both masking groups, the extra-services block, the overall
//! dimensions, and the price formset with its row template.
//!
//! Used by the CLI `demo` command and the integration tests; also a
//! reference for the node and group conventions a real page snapshot
//! is expected to follow.

use crate::document::{Document, Group, GroupKind, Node, RowTemplate};

fn push(doc: &mut Document, node: Node) {
    doc.push_node(node).expect("sample ids are unique");
}

/// Build the full sample order form.
pub fn order_form() -> Document {
    let mut doc = Document::new();

    // --- service block -------------------------------------------------
    push(&mut doc, Node::checkbox("id_paslauga_ktl"));
    push(&mut doc, Node::checkbox("id_paslauga_miltai"));
    push(&mut doc, Node::checkbox("id_paslauga_paruosimas"));
    push(&mut doc, Node::text_input("id_paruosimas"));
    push(&mut doc, Node::text_input("id_padengimas"));
    push(&mut doc, Node::text_input("id_padengimo_standartas"));
    // the color field is always visible and independently editable
    push(&mut doc, Node::text_input("id_miltu_spalva"));
    push(&mut doc, Node::container("ktl-subblock"));
    push(&mut doc, Node::container("miltai-subblock"));
    push(&mut doc, Node::text_input("id_ktl_ilgis_mm").with_decimals(2));
    push(&mut doc, Node::text_input("id_ktl_aukstis_mm").with_decimals(2));
    push(&mut doc, Node::text_input("id_ktl_gylis_mm").with_decimals(2));
    push(&mut doc, Node::output("ktl-sandauga-preview"));

    // --- hanging block -------------------------------------------------
    push(&mut doc, Node::output("ktl-kabinimas-status"));
    push(&mut doc, Node::container("ktl-kabinimas-subblock"));
    push(&mut doc, Node::output("miltai-kabinimas-status"));
    push(&mut doc, Node::container("miltai-kabinimas-subblock"));
    push(&mut doc, Node::text_input("id_kabinimo_budas"));
    push(&mut doc, Node::text_input("id_detaliu_kiekis_reme"));

    // --- extra services ------------------------------------------------
    push(
        &mut doc,
        Node::select("id_papildomos_paslaugos").with_value("ne"),
    );
    push(&mut doc, Node::container("papildomos-paslaugos-aprasymas-row"));
    push(&mut doc, Node::textarea("id_papildomos_paslaugos_aprasymas"));

    // --- overall dimensions --------------------------------------------
    push(&mut doc, Node::text_input("id_x_mm").with_decimals(2));
    push(&mut doc, Node::text_input("id_y_mm").with_decimals(2));
    push(&mut doc, Node::text_input("id_z_mm").with_decimals(2));
    push(&mut doc, Node::output("matmenys-xyz-preview"));

    // --- price formset -------------------------------------------------
    push(&mut doc, Node::container("kainu-formset-body-kainos"));
    push(&mut doc, Node::button("kainos-add-row-kainos"));
    push(
        &mut doc,
        Node::hidden("id_kainos-TOTAL_FORMS")
            .named("kainos-TOTAL_FORMS")
            .with_value("0"),
    );
    push(&mut doc, Node::output("kaina-eur-preview"));
    doc.push_group(
        Group::new("kainos", GroupKind::Pricing, "kainu-formset-body-kainos")
            .with_add_button("kainos-add-row-kainos")
            .with_template(price_row_template()),
    )
    .expect("sample group prefixes are unique");

    // --- masking groups ------------------------------------------------
    for coating in ["ktl", "miltai"] {
        let prefix = format!("maskavimas_{coating}");
        push(
            &mut doc,
            Node::hidden(format!("id_{prefix}-TOTAL_FORMS"))
                .named(format!("{prefix}-TOTAL_FORMS"))
                .with_value("0"),
        );
        push(&mut doc, Node::container(format!("{prefix}-items")));
        push(&mut doc, Node::button(format!("{prefix}-add")));
        push(
            &mut doc,
            Node::select(format!("id_maskavimo_tipas_{coating}")).with_value("nera"),
        );
        doc.push_group(
            Group::new(&prefix, GroupKind::Masking, format!("{prefix}-items"))
                .with_add_button(format!("{prefix}-add"))
                .with_type_selector(format!("id_maskavimo_tipas_{coating}"))
                .with_template(masking_row_template(&prefix)),
        )
        .expect("sample group prefixes are unique");
    }

    doc
}

/// One price row: amount, unit, status, quantity bounds, validity
/// window, note, deletion flag.
fn price_row_template() -> RowTemplate {
    RowTemplate {
        row: "kainos-__prefix__-row".into(),
        fields: vec![
            Node::text_input("id_kainos-__prefix__-kaina")
                .named("kainos-__prefix__-kaina")
                .with_decimals(4),
            Node::select("id_kainos-__prefix__-matas")
                .named("kainos-__prefix__-matas")
                .with_value("vnt"),
            Node::select("id_kainos-__prefix__-busena_ui")
                .named("kainos-__prefix__-busena_ui")
                .with_value("aktuali"),
            Node::text_input("id_kainos-__prefix__-kiekis_nuo")
                .named("kainos-__prefix__-kiekis_nuo")
                .with_decimals(0),
            Node::text_input("id_kainos-__prefix__-kiekis_iki")
                .named("kainos-__prefix__-kiekis_iki")
                .with_decimals(0),
            Node::text_input("id_kainos-__prefix__-galioja_nuo")
                .named("kainos-__prefix__-galioja_nuo"),
            Node::text_input("id_kainos-__prefix__-galioja_iki")
                .named("kainos-__prefix__-galioja_iki"),
            Node::textarea("id_kainos-__prefix__-pastaba")
                .named("kainos-__prefix__-pastaba"),
            Node::checkbox("id_kainos-__prefix__-DELETE")
                .named("kainos-__prefix__-DELETE"),
        ],
    }
}

/// One masking row: masking type, spot count, description, deletion
/// flag, remove button.
fn masking_row_template(prefix: &str) -> RowTemplate {
    RowTemplate {
        row: format!("{prefix}-__prefix__-item"),
        fields: vec![
            Node::text_input(format!("id_{prefix}-__prefix__-maskuote"))
                .named(format!("{prefix}-__prefix__-maskuote")),
            Node::text_input(format!("id_{prefix}-__prefix__-vietu_kiekis"))
                .named(format!("{prefix}-__prefix__-vietu_kiekis"))
                .with_decimals(0),
            Node::textarea(format!("id_{prefix}-__prefix__-aprasymas"))
                .named(format!("{prefix}-__prefix__-aprasymas")),
            Node::checkbox(format!("id_{prefix}-__prefix__-DELETE"))
                .named(format!("{prefix}-__prefix__-DELETE")),
            Node::button(format!("{prefix}-__prefix__-remove")),
        ],
    }
}
