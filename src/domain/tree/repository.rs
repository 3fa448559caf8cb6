use crate::domain::errors::DomainResult;
use crate::domain::tree::entity::{FieldValue, Node};
use crate::domain::tree::services::propagation::PrefixRewrite;
use crate::domain::tree::value_objects::NodeId;
use std::collections::BTreeSet;

/// Change tracking and identity map of the host persistence layer.
pub trait UnitOfWork {
    fn is_newly_created(&self, id: NodeId) -> bool;

    /// Names of the fields whose current value differs from the tracked original.
    fn pending_field_changes(&self, id: NodeId) -> BTreeSet<String>;

    /// Every object currently held for the given inheritance root type,
    /// materialized or not.
    fn loaded_objects(&self, root_type: &str) -> Vec<NodeId>;

    fn is_initialized(&self, id: NodeId) -> bool;

    fn type_of(&self, id: NodeId) -> DomainResult<String>;

    fn read_text(&self, id: NodeId, field: &str) -> Option<String>;

    fn write_text(&mut self, id: NodeId, field: &str, value: String) -> DomainResult<()>;

    fn set_tracked_original_value(
        &mut self,
        id: NodeId,
        field: &str,
        value: String,
    ) -> DomainResult<()>;

    /// Bulk rewrite of the stored slug of every object of `root_type`,
    /// loaded or not. Uninitialized proxies must observe the rewritten value
    /// once materialized.
    fn replace_relative(
        &mut self,
        root_type: &str,
        slug_field: &str,
        rewrite: &PrefixRewrite,
    ) -> DomainResult<()>;
}

/// Dereferences single-valued associations, loading the target if needed.
pub trait AssociationResolver {
    fn resolve_reference(&mut self, id: NodeId, field: &str) -> DomainResult<Option<NodeId>>;
}

/// Everything the tree slug handler needs from the persistence layer.
pub trait ObjectManager: UnitOfWork + AssociationResolver {}

impl<T: UnitOfWork + AssociationResolver + ?Sized> ObjectManager for T {}

pub trait TypeMetadata: Send + Sync {
    fn has_field(&self, type_name: &str, field: &str) -> bool;
    fn is_single_valued_association(&self, type_name: &str, field: &str) -> bool;
    fn root_type_name(&self, type_name: &str) -> DomainResult<String>;
}

pub trait NodeWriteRepository {
    fn persist(&mut self, node: Node) -> DomainResult<()>;
    fn assign(&mut self, id: NodeId, field: &str, value: FieldValue) -> DomainResult<()>;
    fn find(&self, id: NodeId) -> Option<&Node>;
}
