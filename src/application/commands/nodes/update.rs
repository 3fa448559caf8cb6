use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use super::NodeCommandService;
use crate::{
    application::{
        dto::NodeDto,
        error::{ApplicationError, ApplicationResult},
    },
    domain::tree::{NodeId, NodeWriteRepository, ObjectManager},
};

/// Partial update of a managed node. A reference mapped to `null` detaches
/// the node from that association.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNodeCommand {
    pub id: i64,
    #[serde(default)]
    pub text: BTreeMap<String, String>,
    #[serde(default)]
    pub references: BTreeMap<String, Option<i64>>,
}

impl NodeCommandService {
    pub fn update_node<R>(&mut self, om: &mut R, command: UpdateNodeCommand) -> ApplicationResult<NodeDto>
    where
        R: ObjectManager + NodeWriteRepository + ?Sized,
    {
        let id = NodeId::new(command.id)?;
        let type_name = om
            .find(id)
            .map(|node| node.type_name.clone())
            .ok_or_else(|| ApplicationError::not_found(format!("node {id} not found")))?;

        let UpdateNodeCommand {
            id: _,
            text,
            references,
        } = command;

        let values = self.field_values(&type_name, text, references)?;
        let parent_field = self.lifecycle.parent_relation_field(&type_name)?;

        // Nothing is assigned until every value has been checked.
        for (field, value) in &values {
            let Some(Some(target)) = value.as_reference() else {
                continue;
            };
            if target == id {
                return Err(ApplicationError::validation(format!(
                    "node {id} cannot reference itself through `{field}`"
                )));
            }
            if parent_field.as_deref() == Some(field.as_str()) {
                ensure_not_ancestor(om, id, target, field)?;
            }
        }

        for (field, value) in values {
            om.assign(id, &field, value)?;
        }

        let change = self.lifecycle.refresh_slug(om, id)?;
        self.node_dto(&*om, id, change)
    }
}

/// Reject moving `id` under `parent` when `id` is one of `parent`'s ancestors.
fn ensure_not_ancestor<R: ObjectManager + ?Sized>(
    om: &mut R,
    id: NodeId,
    parent: NodeId,
    field: &str,
) -> ApplicationResult<()> {
    let mut visited = BTreeSet::new();
    let mut current = Some(parent);
    while let Some(ancestor) = current {
        if ancestor == id {
            return Err(ApplicationError::validation(format!(
                "node {id} cannot be moved under its own descendant {parent}"
            )));
        }
        if !visited.insert(ancestor) {
            break;
        }
        current = om.resolve_reference(ancestor, field)?;
    }
    Ok(())
}
