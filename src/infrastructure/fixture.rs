// src/infrastructure/fixture.rs
use serde::Deserialize;

use crate::application::commands::nodes::{CreateNodeCommand, UpdateNodeCommand};
use crate::domain::errors::{DomainError, DomainResult};
use crate::infrastructure::{configuration::JsonSlugConfiguration, metadata::TypeRegistry};

/// A self-contained scenario: type metadata, slug configuration, the initial
/// tree and the operations to replay against it.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeFixture {
    pub types: TypeRegistry,
    pub configuration: JsonSlugConfiguration,
    #[serde(default)]
    pub nodes: Vec<CreateNodeCommand>,
    #[serde(default)]
    pub operations: Vec<FixtureOperation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum FixtureOperation {
    Create(CreateNodeCommand),
    Update(UpdateNodeCommand),
}

impl TreeFixture {
    pub fn from_json_str(raw: &str) -> DomainResult<Self> {
        serde_json::from_str(raw)
            .map_err(|err| DomainError::Validation(format!("invalid tree fixture: {err}")))
    }
}
