// src/domain/tree/entity.rs
use crate::domain::tree::value_objects::NodeId;
use std::collections::BTreeMap;

/// A single persisted field value as seen by the unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Reference(Option<NodeId>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Reference(_) => None,
        }
    }

    pub const fn as_reference(&self) -> Option<Option<NodeId>> {
        match self {
            Self::Reference(target) => Some(*target),
            Self::Text(_) => None,
        }
    }
}

/// A managed object of some tree type.
///
/// `initialized` is false for lazy proxies that the persistence layer knows
/// about but has not materialized yet.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub type_name: String,
    pub fields: BTreeMap<String, FieldValue>,
    pub initialized: bool,
}

impl Node {
    pub fn new(id: NodeId, type_name: impl Into<String>) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            fields: BTreeMap::new(),
            initialized: true,
        }
    }

    pub fn with_text(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .insert(field.into(), FieldValue::Text(value.into()));
        self
    }

    pub fn with_reference(mut self, field: impl Into<String>, target: Option<NodeId>) -> Self {
        self.fields
            .insert(field.into(), FieldValue::Reference(target));
        self
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(FieldValue::as_text)
    }

    pub fn reference(&self, field: &str) -> Option<NodeId> {
        self.fields
            .get(field)
            .and_then(FieldValue::as_reference)
            .flatten()
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }
}

/// One field the persistence layer would have to write on flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub id: NodeId,
    pub field: String,
    pub before: Option<FieldValue>,
    pub after: FieldValue,
}

/// Bulk prefix rewrite over the stored slugs of one root type, matched
/// case-insensitively at the start of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeReplacement {
    pub root_type: String,
    pub field: String,
    pub from: String,
    pub to: String,
}

/// What a flush hands to the persistence layer. Relative replacements are
/// applied before the field changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    pub relative_replacements: Vec<RelativeReplacement>,
    pub fields: Vec<FieldChange>,
}

impl Changeset {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.relative_replacements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_node() -> Node {
        Node::new(NodeId(1), "Category")
            .with_text("title", "Fruits")
            .with_text("slug", "food/fruits")
            .with_reference("parent", Some(NodeId(2)))
    }

    #[test]
    fn typed_accessors_ignore_mismatched_kinds() {
        let node = sample_node();
        assert_eq!(node.text("slug"), Some("food/fruits"));
        assert_eq!(node.text("parent"), None);
        assert_eq!(node.reference("parent"), Some(NodeId(2)));
        assert_eq!(node.reference("title"), None);
        assert_eq!(node.reference("missing"), None);
    }

    #[test]
    fn set_replaces_field_value() {
        let mut node = sample_node();
        node.set("parent", FieldValue::Reference(None));
        assert_eq!(node.reference("parent"), None);
        assert_eq!(
            node.fields.get("parent"),
            Some(&FieldValue::Reference(None))
        );
    }
}
