// src/domain/tree/options.rs
use crate::application::ports::configuration::SlugConfigurationSource;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::tree::repository::TypeMetadata;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub const TREE_HANDLER: &str = "tree";
pub const DEFAULT_PATH_SEPARATOR: &str = "/";
pub const DEFAULT_WORD_SEPARATOR: &str = "-";
pub const PARENT_RELATION_FIELD_KEY: &str = "parentRelationField";
pub const SEPARATOR_KEY: &str = "separator";

/// Raw options of one slug handler, as declared in the configuration.
pub type HandlerOptions = Map<String, Value>;

fn default_word_separator() -> String {
    DEFAULT_WORD_SEPARATOR.into()
}

/// Sluggable declaration of one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SluggableConfig {
    pub slug_field: String,
    pub source_fields: Vec<String>,
    #[serde(default = "default_word_separator")]
    pub word_separator: String,
    #[serde(default)]
    pub handlers: BTreeMap<String, HandlerOptions>,
}

impl SluggableConfig {
    pub fn tree_options(&self) -> Option<&HandlerOptions> {
        self.handlers.get(TREE_HANDLER)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSlugOptions {
    pub separator: String,
    pub parent_relation_field: String,
}

impl TreeSlugOptions {
    /// Merge declared handler options over the defaults.
    pub fn from_handler_options(type_name: &str, declared: &HandlerOptions) -> DomainResult<Self> {
        let mut merged = HandlerOptions::new();
        merged.insert(
            SEPARATOR_KEY.into(),
            Value::String(DEFAULT_PATH_SEPARATOR.into()),
        );
        for (key, value) in declared {
            merged.insert(key.clone(), value.clone());
        }

        if !merged.contains_key(PARENT_RELATION_FIELD_KEY) {
            return Err(DomainError::invalid_mapping(
                type_name,
                PARENT_RELATION_FIELD_KEY,
                "tree slug handler requires a parent relation field",
            ));
        }

        serde_json::from_value(Value::Object(merged)).map_err(|err| {
            DomainError::invalid_mapping(type_name, TREE_HANDLER, err.to_string())
        })
    }
}

/// Look up the sluggable declaration of a type, falling back to its
/// inheritance root.
pub fn sluggable_config_for(
    source: &dyn SlugConfigurationSource,
    metadata: &dyn TypeMetadata,
    type_name: &str,
) -> DomainResult<Option<SluggableConfig>> {
    if let Some(config) = source.configuration(type_name) {
        return Ok(Some(config));
    }
    let root = metadata.root_type_name(type_name)?;
    if root == type_name {
        return Ok(None);
    }
    Ok(source.configuration(&root))
}

/// Resolved tree options keyed by type name.
#[derive(Debug, Default)]
pub struct OptionCache {
    entries: HashMap<String, Arc<TreeSlugOptions>>,
}

impl OptionCache {
    pub fn get(&self, type_name: &str) -> Option<Arc<TreeSlugOptions>> {
        self.entries.get(type_name).cloned()
    }

    pub fn insert(&mut self, type_name: impl Into<String>, options: TreeSlugOptions) -> Arc<TreeSlugOptions> {
        let options = Arc::new(options);
        self.entries.insert(type_name.into(), Arc::clone(&options));
        options
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
