// src/infrastructure/configuration.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::ports::configuration::SlugConfigurationSource;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::tree::SluggableConfig;

/// Slug configuration declared as a JSON object keyed by type name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonSlugConfiguration {
    types: BTreeMap<String, SluggableConfig>,
}

impl JsonSlugConfiguration {
    pub fn from_json_str(raw: &str) -> DomainResult<Self> {
        serde_json::from_str(raw)
            .map_err(|err| DomainError::Validation(format!("invalid slug configuration: {err}")))
    }

    #[must_use]
    pub fn with_type(mut self, type_name: impl Into<String>, config: SluggableConfig) -> Self {
        self.types.insert(type_name.into(), config);
        self
    }
}

impl SlugConfigurationSource for JsonSlugConfiguration {
    fn configuration(&self, type_name: &str) -> Option<SluggableConfig> {
        self.types.get(type_name).cloned()
    }

    fn configured_types(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }
}
