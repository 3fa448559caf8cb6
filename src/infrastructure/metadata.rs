// src/infrastructure/metadata.rs
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::tree::TypeMetadata;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Scalar,
    SingleValued(String),
    Collection(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Parent type in the inheritance hierarchy.
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldKind>,
}

impl TypeDescriptor {
    #[must_use]
    pub fn extending(parent: impl Into<String>) -> Self {
        Self {
            extends: Some(parent.into()),
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }
}

/// Declarative type metadata: fields, associations and inheritance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    #[must_use]
    pub fn with_type(mut self, name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        self.types.insert(name.into(), descriptor);
        self
    }

    /// `type_name` followed by its ancestors, nearest first.
    fn lineage(&self, type_name: &str) -> DomainResult<Vec<&TypeDescriptor>> {
        let mut lineage = Vec::new();
        let mut seen = BTreeSet::new();
        let mut current = type_name;

        loop {
            if !seen.insert(current) {
                return Err(DomainError::Validation(format!(
                    "inheritance cycle through type `{current}`"
                )));
            }
            let descriptor = self
                .types
                .get(current)
                .ok_or_else(|| DomainError::NotFound(format!("type `{current}`")))?;
            lineage.push(descriptor);
            match descriptor.extends.as_deref() {
                Some(parent) => current = parent,
                None => return Ok(lineage),
            }
        }
    }

    fn field_kind(&self, type_name: &str, field: &str) -> Option<&FieldKind> {
        self.lineage(type_name)
            .ok()?
            .into_iter()
            .find_map(|descriptor| descriptor.fields.get(field))
    }
}

impl TypeMetadata for TypeRegistry {
    fn has_field(&self, type_name: &str, field: &str) -> bool {
        self.field_kind(type_name, field).is_some()
    }

    fn is_single_valued_association(&self, type_name: &str, field: &str) -> bool {
        matches!(
            self.field_kind(type_name, field),
            Some(FieldKind::SingleValued(_))
        )
    }

    fn root_type_name(&self, type_name: &str) -> DomainResult<String> {
        let mut current = type_name.to_string();
        for _ in 0..=self.types.len() {
            let descriptor = self
                .types
                .get(&current)
                .ok_or_else(|| DomainError::NotFound(format!("type `{current}`")))?;
            match &descriptor.extends {
                Some(parent) => current.clone_from(parent),
                None => return Ok(current),
            }
        }
        Err(DomainError::Validation(format!(
            "inheritance cycle through type `{type_name}`"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        TypeRegistry::default()
            .with_type(
                "Category",
                TypeDescriptor::default()
                    .field("title", FieldKind::Scalar)
                    .field("slug", FieldKind::Scalar)
                    .field("parent", FieldKind::SingleValued("Category".into()))
                    .field("children", FieldKind::Collection("Category".into())),
            )
            .with_type(
                "FeaturedCategory",
                TypeDescriptor::extending("Category").field("badge", FieldKind::Scalar),
            )
    }

    #[test]
    fn association_kinds_are_distinguished() {
        let registry = registry();
        assert!(registry.is_single_valued_association("Category", "parent"));
        assert!(!registry.is_single_valued_association("Category", "children"));
        assert!(!registry.is_single_valued_association("Category", "title"));
        assert!(!registry.is_single_valued_association("Category", "missing"));
    }

    #[test]
    fn subtypes_inherit_fields_and_root() {
        let registry = registry();
        assert!(registry.has_field("FeaturedCategory", "badge"));
        assert!(registry.is_single_valued_association("FeaturedCategory", "parent"));
        assert!(!registry.has_field("Category", "badge"));
        assert_eq!(
            registry.root_type_name("FeaturedCategory").unwrap(),
            "Category"
        );
        assert_eq!(registry.root_type_name("Category").unwrap(), "Category");
    }

    #[test]
    fn unknown_types_and_cycles_are_errors() {
        let registry = TypeRegistry::default()
            .with_type("A", TypeDescriptor::extending("B"))
            .with_type("B", TypeDescriptor::extending("A"));
        assert!(matches!(
            registry.root_type_name("A"),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            registry.root_type_name("Zed"),
            Err(DomainError::NotFound(_))
        ));
        assert!(!registry.has_field("A", "anything"));
    }

    #[test]
    fn deserializes_from_json() {
        let registry: TypeRegistry = serde_json::from_str(
            r#"{"Category": {"fields": {"slug": "scalar", "parent": {"singleValued": "Category"}}}}"#,
        )
        .unwrap();
        assert!(registry.is_single_valued_association("Category", "parent"));
    }
}
