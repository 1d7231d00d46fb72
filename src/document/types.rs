//! Node and group types for the form document model.
//!
//! All types derive `Serialize + Deserialize` so the same types work
//! for both Rust API construction and JSON loading — a document built
//! with the constructors below and one parsed from a page snapshot are
//! indistinguishable to the engine.

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// What kind of element a node stands for.
///
/// The engine cares about a node's behavior, not its markup: checkable
/// things carry `checked`, value-bearing things carry `value`, and
/// `Output`/`Container` nodes exist to be written to or shown/hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Single-line text input (the default).
    #[default]
    TextInput,
    /// Hidden input (total-count fields).
    Hidden,
    /// Checkbox-like field (service drivers, deletion flags).
    Checkbox,
    /// Select with a string value.
    Select,
    /// Multi-line text input.
    Textarea,
    /// Read-only derived display (previews, status labels).
    Output,
    /// Clickable control (add-row / remove-row buttons).
    Button,
    /// Grouping element that is only shown or hidden.
    Container,
}

/// One element of the rendered form.
///
/// The document is the single source of truth: the engine never caches
/// a shadow copy of a node's state — every read goes back here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Stable element id (e.g. `id_paslauga_ktl`).
    pub id: String,
    /// Form field name (e.g. `kainos-0-kaina`), when the node is a
    /// submitted field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: NodeKind,
    /// Raw text value. For `Output` nodes this is the displayed text.
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub checked: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Declared decimal precision (`data-decimals` in the original
    /// markup). Presence opts the field into decimal normalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    /// Owning row-group prefix, for nodes that live inside a group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Owning row ordinal within the group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl Node {
    /// Create a node of the given kind with everything else default.
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind,
            value: String::new(),
            checked: false,
            enabled: true,
            visible: true,
            decimals: None,
            group: None,
            row: None,
        }
    }

    /// A text input.
    pub fn text_input(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::TextInput)
    }

    /// A checkbox.
    pub fn checkbox(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Checkbox)
    }

    /// A select.
    pub fn select(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Select)
    }

    /// A textarea.
    pub fn textarea(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Textarea)
    }

    /// A hidden input.
    pub fn hidden(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Hidden)
    }

    /// A read-only output.
    pub fn output(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Output)
    }

    /// A button.
    pub fn button(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Button)
    }

    /// A show/hide container.
    pub fn container(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Container)
    }

    /// Set the form field name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the initial value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the checked state.
    pub fn with_checked(mut self, on: bool) -> Self {
        self.checked = on;
        self
    }

    /// Declare a decimal precision.
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = Some(decimals);
        self
    }

    /// Start hidden.
    pub fn hidden_initially(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Tag the node with its owning group and row.
    pub fn in_row(mut self, group: impl Into<String>, row: usize) -> Self {
        self.group = Some(group.into());
        self.row = Some(row);
        self
    }
}

/// Which engine section manages a row group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Price-list group (table of price rows with validity windows).
    Pricing,
    /// Masking-items group (coupled to a parent type selector).
    Masking,
}

/// Template for one row of a repeatable group.
///
/// Every occurrence of the literal `__prefix__` token in the row id
/// and in each field's id/name/value is replaced with the new row's
/// ordinal index at instantiation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowTemplate {
    /// Id template of the row's own node (e.g. `kainos-__prefix__-row`).
    pub row: String,
    /// Field templates cloned into every new row.
    pub fields: Vec<Node>,
}

/// One row slot of a repeatable group.
///
/// Rows are created on add and only ever removed from the document
/// when they are an unsubmitted placeholder being replaced. A
/// user-visible delete sets the row's `-DELETE` field and hides the
/// row node, preserving index-to-data correspondence with the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    /// Ordinal index, assigned at creation, never reused.
    pub index: usize,
    /// Id of the row's own node (visibility anchor).
    pub node: String,
    /// Unsubmitted placeholder injected before the first real row.
    #[serde(default)]
    pub placeholder: bool,
}

/// A named repeatable row group (formset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique prefix shared by all of the group's field names.
    pub prefix: String,
    pub kind: GroupKind,
    /// Id of the row container node (shown/hidden as a whole).
    pub container: String,
    /// Id of the add-row button, when the page renders one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_button: Option<String>,
    /// Id of the parent type selector flipped back to its "none"
    /// state when a masking group loses its last visible row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<RowTemplate>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Group {
    /// Create a group with no rows and no template.
    pub fn new(prefix: impl Into<String>, kind: GroupKind, container: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            kind,
            container: container.into(),
            add_button: None,
            type_selector: None,
            template: None,
            rows: Vec::new(),
        }
    }

    /// Set the add-row button id.
    pub fn with_add_button(mut self, id: impl Into<String>) -> Self {
        self.add_button = Some(id.into());
        self
    }

    /// Set the parent type selector id.
    pub fn with_type_selector(mut self, id: impl Into<String>) -> Self {
        self.type_selector = Some(id.into());
        self
    }

    /// Set the row template.
    pub fn with_template(mut self, template: RowTemplate) -> Self {
        self.template = Some(template);
        self
    }
}

/// The name of a group's hidden total-count field.
pub fn total_forms_name(prefix: &str) -> String {
    format!("{prefix}-TOTAL_FORMS")
}

/// The name of a row's deletion-flag field.
pub fn delete_field_name(prefix: &str, index: usize) -> String {
    format!("{prefix}-{index}-DELETE")
}
