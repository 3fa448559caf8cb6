// src/application/commands/nodes/service.rs
use std::sync::Arc;

use crate::{
    application::{
        dto::NodeDto,
        error::{ApplicationError, ApplicationResult},
        services::SlugLifecycleService,
    },
    domain::tree::{NodeId, NodeWriteRepository, TreeSlugEvent, TypeMetadata, UnitOfWork},
};

pub struct NodeCommandService {
    pub(super) lifecycle: SlugLifecycleService,
    pub(super) metadata: Arc<dyn TypeMetadata>,
}

impl NodeCommandService {
    pub fn new(lifecycle: SlugLifecycleService, metadata: Arc<dyn TypeMetadata>) -> Self {
        Self {
            lifecycle,
            metadata,
        }
    }

    pub const fn lifecycle(&self) -> &SlugLifecycleService {
        &self.lifecycle
    }

    /// Current slug state of a managed node.
    pub fn describe<R>(&self, om: &R, id: NodeId) -> ApplicationResult<NodeDto>
    where
        R: UnitOfWork + NodeWriteRepository + ?Sized,
    {
        self.node_dto(om, id, None)
    }

    pub(super) fn node_dto<R>(
        &self,
        om: &R,
        id: NodeId,
        change: Option<TreeSlugEvent>,
    ) -> ApplicationResult<NodeDto>
    where
        R: UnitOfWork + NodeWriteRepository + ?Sized,
    {
        let type_name = om
            .find(id)
            .map(|node| node.type_name.clone())
            .ok_or_else(|| ApplicationError::not_found(format!("node {id} not found")))?;
        let slug_field = self.lifecycle.config_for(&type_name)?.slug_field;

        Ok(NodeDto {
            id: id.into(),
            slug: om.read_text(id, &slug_field),
            type_name,
            change: change.map(Into::into),
        })
    }
}
