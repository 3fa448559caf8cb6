use std::collections::BTreeMap;

use serde::Deserialize;

use super::NodeCommandService;
use crate::{
    application::{
        dto::NodeDto,
        error::{ApplicationError, ApplicationResult},
    },
    domain::tree::{Node, NodeId, NodeWriteRepository, ObjectManager},
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateNodeCommand {
    pub id: i64,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub text: BTreeMap<String, String>,
    #[serde(default)]
    pub references: BTreeMap<String, Option<i64>>,
}

impl NodeCommandService {
    pub fn create_node<R>(&mut self, om: &mut R, command: CreateNodeCommand) -> ApplicationResult<NodeDto>
    where
        R: ObjectManager + NodeWriteRepository + ?Sized,
    {
        let id = NodeId::new(command.id)?;
        if om.find(id).is_some() {
            return Err(ApplicationError::conflict(format!("node {id} already exists")));
        }

        let CreateNodeCommand {
            id: _,
            type_name,
            text,
            references,
        } = command;

        let mut node = Node::new(id, type_name.clone());
        for (field, value) in self.field_values(&type_name, text, references)? {
            node.set(field, value);
        }
        om.persist(node)?;

        let change = self.lifecycle.refresh_slug(om, id)?;
        self.node_dto(&*om, id, change)
    }
}
