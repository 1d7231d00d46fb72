//! # Form Document Model
//!
//! A single type hierarchy that is both the Rust API and the JSON API.
//! `Document` is constructible in Rust and deserializable from a page
//! snapshot in JSON; either way it is the engine's single source of
//! truth — the in-memory stand-in for the rendered document tree.
//!
//! ```
//! use pozform::document::{Document, Node};
//!
//! // Rust construction
//! let mut doc = Document::new();
//! doc.push_node(Node::checkbox("id_paslauga_ktl")).unwrap();
//!
//! // JSON loading
//! let doc: Document = pozform::document::Document::from_json(
//!     r#"{"nodes": [{"id": "id_paslauga_ktl", "kind": "checkbox"}], "groups": []}"#,
//! ).unwrap();
//! assert!(doc.node("id_paslauga_ktl").is_some());
//! ```
//!
//! ## The `Surface` seam
//!
//! Rule logic never touches `Document` directly: everything is written
//! against the thin [`Surface`] read/write trait, so the constraint
//! engine and row-group manager can be driven by any rendering surface
//! that implements it. `Document` is the in-memory implementation used
//! by the tests and the CLI; a browser bridge is an external
//! collaborator.

pub mod types;

pub use types::*;

use crate::error::PozformError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Owned snapshot of a group's configuration, for rule logic.
#[derive(Debug, Clone)]
pub struct GroupInfo {
    pub prefix: String,
    pub kind: GroupKind,
    pub container: String,
    pub add_button: Option<String>,
    pub type_selector: Option<String>,
    pub has_template: bool,
}

/// Owned snapshot of one row slot.
#[derive(Debug, Clone)]
pub struct RowInfo {
    pub index: usize,
    pub node: String,
    pub placeholder: bool,
}

/// A fully instantiated row ready to append to a group.
#[derive(Debug, Clone)]
pub struct NewRow {
    pub index: usize,
    /// Id for the row's own (container) node.
    pub node: String,
    pub fields: Vec<Node>,
}

/// Thin read/write adapter over the rendered form.
///
/// Keys resolve against element ids first, then field names, so rule
/// code can address `id_paslauga_ktl` and `kainos-0-kaina` alike.
/// Mutators return `false` when the node is absent — optional sections
/// degrade silently instead of erroring.
pub trait Surface {
    /// Whether a node exists under this key.
    fn exists(&self, key: &str) -> bool;
    /// Canonical element id for a key (which may be a field name).
    fn id_of(&self, key: &str) -> Option<String>;
    /// The node's kind.
    fn kind(&self, key: &str) -> Option<NodeKind>;
    /// Current raw value.
    fn value(&self, key: &str) -> Option<String>;
    /// Write a raw value.
    fn set_value(&mut self, key: &str, value: &str) -> bool;
    /// Checkbox state (`false` for absent nodes).
    fn is_checked(&self, key: &str) -> bool;
    /// Set checkbox state.
    fn set_checked(&mut self, key: &str, on: bool) -> bool;
    /// Whether the node accepts user interaction.
    fn is_enabled(&self, key: &str) -> bool;
    /// Enable or disable the node.
    fn set_enabled(&mut self, key: &str, on: bool) -> bool;
    /// Whether the node is shown.
    fn is_visible(&self, key: &str) -> bool;
    /// Show or hide the node.
    fn set_visible(&mut self, key: &str, on: bool) -> bool;
    /// Declared decimal precision, if any.
    fn decimals(&self, key: &str) -> Option<u8>;
    /// The node's form field name.
    fn name_of(&self, key: &str) -> Option<String>;
    /// The node's owning group prefix.
    fn group_of(&self, key: &str) -> Option<String>;
    /// The node's owning row ordinal.
    fn row_of(&self, key: &str) -> Option<usize>;
    /// Ids of every field declaring a decimal precision.
    fn decimal_fields(&self) -> Vec<String>;

    /// Every registered row group.
    fn groups(&self) -> Vec<GroupInfo>;
    /// One group by prefix.
    fn group(&self, prefix: &str) -> Option<GroupInfo>;
    /// The group's row slots, in document order.
    fn rows(&self, prefix: &str) -> Vec<RowInfo>;
    /// Ids of the field nodes belonging to one row, in document order.
    fn row_fields(&self, prefix: &str, index: usize) -> Vec<String>;
    /// The group's row template.
    fn template(&self, prefix: &str) -> Option<RowTemplate>;
    /// Remove the group's unsubmitted placeholder row, if present.
    /// This is the one legitimate structural removal.
    fn consume_placeholder(&mut self, prefix: &str) -> bool;
    /// Append an instantiated row (row node plus field nodes).
    fn push_row(&mut self, prefix: &str, row: NewRow) -> Result<(), PozformError>;
}

/// Serialized shape of a document: just nodes and groups. Indexes are
/// rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentData {
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    groups: Vec<Group>,
}

/// The in-memory rendered form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "DocumentData", into = "DocumentData")]
pub struct Document {
    nodes: Vec<Node>,
    groups: Vec<Group>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<DocumentData> for Document {
    type Error = PozformError;

    fn try_from(data: DocumentData) -> Result<Self, Self::Error> {
        let mut doc = Document::new();
        for node in data.nodes {
            doc.push_node(node)?;
        }
        for group in data.groups {
            doc.push_group(group)?;
        }
        Ok(doc)
    }
}

impl From<Document> for DocumentData {
    fn from(doc: Document) -> Self {
        Self {
            nodes: doc.nodes,
            groups: doc.groups,
        }
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            groups: Vec::new(),
            by_id: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Load a document from a JSON page snapshot.
    pub fn from_json(json: &str) -> Result<Self, PozformError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the current state as pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, PozformError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add a node. Ids must be unique; duplicate field names keep the
    /// first node as the name lookup target (document order wins).
    pub fn push_node(&mut self, node: Node) -> Result<(), PozformError> {
        if self.by_id.contains_key(&node.id) {
            return Err(PozformError::DuplicateNode(node.id));
        }
        let idx = self.nodes.len();
        self.by_id.insert(node.id.clone(), idx);
        if let Some(name) = &node.name {
            self.by_name.entry(name.clone()).or_insert(idx);
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Register a row group.
    pub fn push_group(&mut self, group: Group) -> Result<(), PozformError> {
        if self.groups.iter().any(|g| g.prefix == group.prefix) {
            return Err(PozformError::InvalidDocument(format!(
                "duplicate group prefix: {}",
                group.prefix
            )));
        }
        self.groups.push(group);
        Ok(())
    }

    /// Read access to a node by id or name.
    pub fn node(&self, key: &str) -> Option<&Node> {
        self.idx(key).map(|i| &self.nodes[i])
    }

    fn idx(&self, key: &str) -> Option<usize> {
        self.by_id
            .get(key)
            .or_else(|| self.by_name.get(key))
            .copied()
    }

    fn node_mut(&mut self, key: &str) -> Option<&mut Node> {
        let i = self.idx(key)?;
        Some(&mut self.nodes[i])
    }

    fn group_ref(&self, prefix: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.prefix == prefix)
    }

    fn rebuild_index(&mut self) {
        self.by_id.clear();
        self.by_name.clear();
        for (idx, node) in self.nodes.iter().enumerate() {
            self.by_id.insert(node.id.clone(), idx);
            if let Some(name) = &node.name {
                self.by_name.entry(name.clone()).or_insert(idx);
            }
        }
    }
}

fn info(group: &Group) -> GroupInfo {
    GroupInfo {
        prefix: group.prefix.clone(),
        kind: group.kind,
        container: group.container.clone(),
        add_button: group.add_button.clone(),
        type_selector: group.type_selector.clone(),
        has_template: group.template.is_some(),
    }
}

impl Surface for Document {
    fn exists(&self, key: &str) -> bool {
        self.idx(key).is_some()
    }

    fn id_of(&self, key: &str) -> Option<String> {
        self.node(key).map(|n| n.id.clone())
    }

    fn kind(&self, key: &str) -> Option<NodeKind> {
        self.node(key).map(|n| n.kind)
    }

    fn value(&self, key: &str) -> Option<String> {
        self.node(key).map(|n| n.value.clone())
    }

    fn set_value(&mut self, key: &str, value: &str) -> bool {
        match self.node_mut(key) {
            Some(node) => {
                node.value = value.to_string();
                true
            }
            None => false,
        }
    }

    fn is_checked(&self, key: &str) -> bool {
        self.node(key).is_some_and(|n| n.checked)
    }

    fn set_checked(&mut self, key: &str, on: bool) -> bool {
        match self.node_mut(key) {
            Some(node) => {
                node.checked = on;
                true
            }
            None => false,
        }
    }

    fn is_enabled(&self, key: &str) -> bool {
        self.node(key).is_some_and(|n| n.enabled)
    }

    fn set_enabled(&mut self, key: &str, on: bool) -> bool {
        match self.node_mut(key) {
            Some(node) => {
                node.enabled = on;
                true
            }
            None => false,
        }
    }

    fn is_visible(&self, key: &str) -> bool {
        self.node(key).is_some_and(|n| n.visible)
    }

    fn set_visible(&mut self, key: &str, on: bool) -> bool {
        match self.node_mut(key) {
            Some(node) => {
                node.visible = on;
                true
            }
            None => false,
        }
    }

    fn decimals(&self, key: &str) -> Option<u8> {
        self.node(key).and_then(|n| n.decimals)
    }

    fn name_of(&self, key: &str) -> Option<String> {
        self.node(key).and_then(|n| n.name.clone())
    }

    fn group_of(&self, key: &str) -> Option<String> {
        self.node(key).and_then(|n| n.group.clone())
    }

    fn row_of(&self, key: &str) -> Option<usize> {
        self.node(key).and_then(|n| n.row)
    }

    fn decimal_fields(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| n.decimals.is_some())
            .map(|n| n.id.clone())
            .collect()
    }

    fn groups(&self) -> Vec<GroupInfo> {
        self.groups.iter().map(info).collect()
    }

    fn group(&self, prefix: &str) -> Option<GroupInfo> {
        self.group_ref(prefix).map(info)
    }

    fn rows(&self, prefix: &str) -> Vec<RowInfo> {
        self.group_ref(prefix)
            .map(|g| {
                g.rows
                    .iter()
                    .map(|r| RowInfo {
                        index: r.index,
                        node: r.node.clone(),
                        placeholder: r.placeholder,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn row_fields(&self, prefix: &str, index: usize) -> Vec<String> {
        let Some(group) = self.group_ref(prefix) else {
            return Vec::new();
        };
        let row_node = group.rows.iter().find(|r| r.index == index).map(|r| r.node.clone());
        self.nodes
            .iter()
            .filter(|n| {
                n.group.as_deref() == Some(prefix)
                    && n.row == Some(index)
                    && Some(&n.id) != row_node.as_ref()
            })
            .map(|n| n.id.clone())
            .collect()
    }

    fn template(&self, prefix: &str) -> Option<RowTemplate> {
        self.group_ref(prefix).and_then(|g| g.template.clone())
    }

    fn consume_placeholder(&mut self, prefix: &str) -> bool {
        let Some(group_pos) = self.groups.iter().position(|g| g.prefix == prefix) else {
            return false;
        };
        let Some(row_pos) = self.groups[group_pos].rows.iter().position(|r| r.placeholder) else {
            return false;
        };
        let row = self.groups[group_pos].rows.remove(row_pos);
        self.nodes.retain(|n| {
            n.id != row.node && !(n.group.as_deref() == Some(prefix) && n.row == Some(row.index))
        });
        self.rebuild_index();
        true
    }

    fn push_row(&mut self, prefix: &str, row: NewRow) -> Result<(), PozformError> {
        if self.group_ref(prefix).is_none() {
            return Err(PozformError::UnknownGroup(prefix.to_string()));
        }
        // Check all ids up front so a collision mutates nothing.
        if self.by_id.contains_key(&row.node) {
            return Err(PozformError::DuplicateNode(row.node));
        }
        for field in &row.fields {
            if self.by_id.contains_key(&field.id) {
                return Err(PozformError::DuplicateNode(field.id.clone()));
            }
        }

        let row_node = Node::container(row.node.clone()).in_row(prefix, row.index);
        self.push_node(row_node)?;
        for mut field in row.fields {
            field.group = Some(prefix.to_string());
            field.row = Some(row.index);
            self.push_node(field)?;
        }

        let group = self
            .groups
            .iter_mut()
            .find(|g| g.prefix == prefix)
            .expect("group checked above");
        group.rows.push(Row {
            index: row.index,
            node: row.node,
            placeholder: false,
        });
        Ok(())
    }
}
