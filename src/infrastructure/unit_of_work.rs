// src/infrastructure/unit_of_work.rs
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::tree::services::PrefixRewrite;
use crate::domain::tree::{
    AssociationResolver, Changeset, FieldChange, FieldValue, Node, NodeId, NodeWriteRepository,
    RelativeReplacement, TypeMetadata, UnitOfWork,
};

/// In-memory identity map with per-field change tracking.
///
/// Objects are grouped by inheritance root type. Every managed object keeps a
/// snapshot of its field values as of the last commit, standing in for the
/// stored row; the difference between the live values and that snapshot is
/// what [`Self::commit`] reports. Proxies hold their stored values only.
pub struct InMemoryUnitOfWork {
    metadata: Arc<dyn TypeMetadata>,
    identity_map: BTreeMap<String, BTreeMap<NodeId, Node>>,
    roots: HashMap<NodeId, String>,
    originals: HashMap<NodeId, BTreeMap<String, FieldValue>>,
    scheduled_inserts: BTreeSet<NodeId>,
    relative_replacements: Vec<RelativeReplacement>,
}

impl InMemoryUnitOfWork {
    pub fn new(metadata: Arc<dyn TypeMetadata>) -> Self {
        Self {
            metadata,
            identity_map: BTreeMap::new(),
            roots: HashMap::new(),
            originals: HashMap::new(),
            scheduled_inserts: BTreeSet::new(),
            relative_replacements: Vec::new(),
        }
    }

    /// Register an object as loaded from storage: its current fields become
    /// the tracked originals.
    pub fn register_managed(&mut self, node: Node) -> DomainResult<()> {
        self.originals.insert(node.id, node.fields.clone());
        self.attach(node)
    }

    /// Register an object the storage knows about but that has not been
    /// materialized yet.
    pub fn register_proxy(&mut self, mut node: Node) -> DomainResult<()> {
        node.initialized = false;
        self.register_managed(node)
    }

    pub fn initialize(&mut self, id: NodeId) -> DomainResult<()> {
        let node = self.node_mut(id)?;
        if !node.initialized {
            tracing::trace!(node = %id, "materializing proxy");
            node.initialized = true;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Flush: report the pending bulk replacements and every field that
    /// differs from its tracked original, then take the live values as the
    /// new originals.
    pub fn commit(&mut self) -> Changeset {
        let mut changes = Vec::new();

        for node in self.identity_map.values().flat_map(BTreeMap::values) {
            if !node.initialized {
                continue;
            }
            let original = self.originals.entry(node.id).or_default();
            for (field, value) in &node.fields {
                let before = original.get(field);
                if before != Some(value) {
                    changes.push(FieldChange {
                        id: node.id,
                        field: field.clone(),
                        before: before.cloned(),
                        after: value.clone(),
                    });
                }
            }
            original.clone_from(&node.fields);
        }

        self.scheduled_inserts.clear();
        let changeset = Changeset {
            relative_replacements: std::mem::take(&mut self.relative_replacements),
            fields: changes,
        };
        tracing::debug!(
            changes = changeset.fields.len(),
            replacements = changeset.relative_replacements.len(),
            "unit of work committed"
        );
        changeset
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.identity_map.values().flat_map(BTreeMap::values)
    }

    fn attach(&mut self, node: Node) -> DomainResult<()> {
        if self.roots.contains_key(&node.id) {
            return Err(DomainError::Persistence(format!(
                "node {} is already managed",
                node.id
            )));
        }
        let root = self.metadata.root_type_name(&node.type_name)?;
        self.roots.insert(node.id, root.clone());
        self.identity_map
            .entry(root)
            .or_default()
            .insert(node.id, node);
        Ok(())
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let root = self.roots.get(&id)?;
        self.identity_map.get(root)?.get(&id)
    }

    fn node_mut(&mut self, id: NodeId) -> DomainResult<&mut Node> {
        let root = self
            .roots
            .get(&id)
            .ok_or_else(|| DomainError::NotFound(format!("node {id}")))?;
        self.identity_map
            .get_mut(root)
            .and_then(|objects| objects.get_mut(&id))
            .ok_or_else(|| DomainError::NotFound(format!("node {id}")))
    }
}

impl UnitOfWork for InMemoryUnitOfWork {
    fn is_newly_created(&self, id: NodeId) -> bool {
        self.scheduled_inserts.contains(&id)
    }

    fn pending_field_changes(&self, id: NodeId) -> BTreeSet<String> {
        let Some(node) = self.node(id) else {
            return BTreeSet::new();
        };
        let original = self.originals.get(&id);
        node.fields
            .iter()
            .filter(|(field, value)| {
                original.and_then(|snapshot| snapshot.get(*field)) != Some(*value)
            })
            .map(|(field, _)| field.clone())
            .collect()
    }

    fn loaded_objects(&self, root_type: &str) -> Vec<NodeId> {
        self.identity_map
            .get(root_type)
            .map(|objects| objects.keys().copied().collect())
            .unwrap_or_default()
    }

    fn is_initialized(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.initialized)
    }

    fn type_of(&self, id: NodeId) -> DomainResult<String> {
        self.node(id)
            .map(|node| node.type_name.clone())
            .ok_or_else(|| DomainError::NotFound(format!("node {id}")))
    }

    fn read_text(&self, id: NodeId, field: &str) -> Option<String> {
        self.node(id)?.text(field).map(ToOwned::to_owned)
    }

    fn write_text(&mut self, id: NodeId, field: &str, value: String) -> DomainResult<()> {
        self.node_mut(id)?.set(field, FieldValue::Text(value));
        Ok(())
    }

    fn set_tracked_original_value(
        &mut self,
        id: NodeId,
        field: &str,
        value: String,
    ) -> DomainResult<()> {
        if !self.roots.contains_key(&id) {
            return Err(DomainError::NotFound(format!("node {id}")));
        }
        self.originals
            .entry(id)
            .or_default()
            .insert(field.to_string(), FieldValue::Text(value));
        Ok(())
    }

    fn replace_relative(
        &mut self,
        root_type: &str,
        slug_field: &str,
        rewrite: &PrefixRewrite,
    ) -> DomainResult<()> {
        let objects = self
            .identity_map
            .get_mut(root_type)
            .into_iter()
            .flat_map(BTreeMap::values_mut);
        for node in objects {
            let stored = self
                .originals
                .get_mut(&node.id)
                .and_then(|snapshot| snapshot.get_mut(slug_field));
            if let Some(FieldValue::Text(stored)) = stored {
                if let Some(rewritten) = rewrite.apply(stored) {
                    *stored = rewritten;
                }
            }
            if node.initialized {
                continue;
            }
            let rewritten = node.text(slug_field).and_then(|slug| rewrite.apply(slug));
            if let Some(rewritten) = rewritten {
                tracing::trace!(node = %node.id, to = %rewritten, "rewriting stored proxy slug");
                node.set(slug_field, FieldValue::Text(rewritten));
            }
        }

        self.relative_replacements.push(RelativeReplacement {
            root_type: root_type.to_string(),
            field: slug_field.to_string(),
            from: rewrite.prefix().to_string(),
            to: rewrite.replacement().to_string(),
        });
        Ok(())
    }
}

impl AssociationResolver for InMemoryUnitOfWork {
    fn resolve_reference(&mut self, id: NodeId, field: &str) -> DomainResult<Option<NodeId>> {
        let node = self
            .node(id)
            .ok_or_else(|| DomainError::NotFound(format!("node {id}")))?;
        let Some(target) = node.reference(field) else {
            return Ok(None);
        };
        if !self.roots.contains_key(&target) {
            return Err(DomainError::NotFound(format!(
                "node {target} referenced by {id} through `{field}`"
            )));
        }
        self.initialize(target)?;
        Ok(Some(target))
    }
}

impl NodeWriteRepository for InMemoryUnitOfWork {
    fn persist(&mut self, node: Node) -> DomainResult<()> {
        let id = node.id;
        self.attach(node)?;
        self.scheduled_inserts.insert(id);
        Ok(())
    }

    fn assign(&mut self, id: NodeId, field: &str, value: FieldValue) -> DomainResult<()> {
        self.node_mut(id)?.set(field, value);
        Ok(())
    }

    fn find(&self, id: NodeId) -> Option<&Node> {
        self.node(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::metadata::{FieldKind, TypeDescriptor, TypeRegistry};

    fn uow() -> InMemoryUnitOfWork {
        let registry = TypeRegistry::default()
            .with_type(
                "Category",
                TypeDescriptor::default()
                    .field("title", FieldKind::Scalar)
                    .field("slug", FieldKind::Scalar)
                    .field("parent", FieldKind::SingleValued("Category".into())),
            )
            .with_type("Shelf", TypeDescriptor::extending("Category"));
        InMemoryUnitOfWork::new(Arc::new(registry))
    }

    fn category(id: i64, slug: &str) -> Node {
        Node::new(NodeId(id), "Category")
            .with_text("title", slug)
            .with_text("slug", slug)
    }

    #[test]
    fn managed_objects_start_clean() {
        let mut uow = uow();
        uow.register_managed(category(1, "food")).unwrap();
        assert!(uow.pending_field_changes(NodeId(1)).is_empty());
        assert!(!uow.is_newly_created(NodeId(1)));

        uow.write_text(NodeId(1), "slug", "produce".into()).unwrap();
        assert_eq!(
            uow.pending_field_changes(NodeId(1)),
            BTreeSet::from(["slug".to_string()])
        );
    }

    #[test]
    fn persisted_objects_are_new_until_commit() {
        let mut uow = uow();
        uow.persist(category(1, "food")).unwrap();
        assert!(uow.is_newly_created(NodeId(1)));
        assert_eq!(uow.pending_field_changes(NodeId(1)).len(), 2);

        let changes = uow.commit().fields;
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|change| change.before.is_none()));
        assert!(!uow.is_newly_created(NodeId(1)));
        assert!(uow.commit().is_empty());
    }

    #[test]
    fn tracked_original_hides_change_from_commit() {
        let mut uow = uow();
        uow.register_managed(category(1, "food/fruits")).unwrap();
        uow.write_text(NodeId(1), "slug", "produce/fruits".into())
            .unwrap();
        uow.set_tracked_original_value(NodeId(1), "slug", "produce/fruits".into())
            .unwrap();
        assert!(uow.pending_field_changes(NodeId(1)).is_empty());
        assert!(uow.commit().is_empty());
    }

    #[test]
    fn relative_replacement_rewrites_stored_proxies_and_is_flushed() {
        let mut uow = uow();
        uow.register_managed(category(1, "food/fruits")).unwrap();
        uow.register_proxy(category(2, "food/fruits/apples")).unwrap();
        uow.register_proxy(category(3, "seafood/fish")).unwrap();

        let rewrite = PrefixRewrite::new("food", "produce", "/").unwrap();
        uow.replace_relative("Category", "slug", &rewrite).unwrap();

        assert_eq!(uow.read_text(NodeId(2), "slug").as_deref(), Some("produce/fruits/apples"));
        assert_eq!(uow.read_text(NodeId(3), "slug").as_deref(), Some("seafood/fish"));
        // Loaded objects keep their live value until rewritten in memory.
        assert_eq!(uow.read_text(NodeId(1), "slug").as_deref(), Some("food/fruits"));

        uow.initialize(NodeId(2)).unwrap();
        assert!(uow.pending_field_changes(NodeId(2)).is_empty());

        let changeset = uow.commit();
        assert_eq!(
            changeset.relative_replacements,
            vec![RelativeReplacement {
                root_type: "Category".into(),
                field: "slug".into(),
                from: "food/".into(),
                to: "produce/".into(),
            }]
        );
        assert!(uow.commit().relative_replacements.is_empty());
    }

    #[test]
    fn subtypes_share_the_root_identity_map() {
        let mut uow = uow();
        uow.register_managed(category(1, "food")).unwrap();
        uow.register_managed(
            Node::new(NodeId(2), "Shelf").with_text("slug", "food/top"),
        )
        .unwrap();
        assert_eq!(uow.loaded_objects("Category"), vec![NodeId(1), NodeId(2)]);
        assert!(uow.loaded_objects("Shelf").is_empty());
        assert_eq!(uow.type_of(NodeId(2)).unwrap(), "Shelf");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut uow = uow();
        uow.register_managed(category(1, "food")).unwrap();
        assert!(matches!(
            uow.persist(category(1, "again")),
            Err(DomainError::Persistence(_))
        ));
        assert_eq!(uow.len(), 1);
    }

    #[test]
    fn resolving_a_reference_materializes_the_target() {
        let mut uow = uow();
        uow.register_proxy(category(1, "food")).unwrap();
        uow.register_managed(category(2, "food/fruits").with_reference("parent", Some(NodeId(1))))
            .unwrap();
        assert!(!uow.is_initialized(NodeId(1)));

        let parent = uow.resolve_reference(NodeId(2), "parent").unwrap();
        assert_eq!(parent, Some(NodeId(1)));
        assert!(uow.is_initialized(NodeId(1)));
        assert_eq!(uow.resolve_reference(NodeId(1), "parent").unwrap(), None);
    }

    #[test]
    fn dangling_reference_is_not_found() {
        let mut uow = uow();
        uow.register_managed(category(2, "x").with_reference("parent", Some(NodeId(9))))
            .unwrap();
        assert!(matches!(
            uow.resolve_reference(NodeId(2), "parent"),
            Err(DomainError::NotFound(_))
        ));
    }
}
