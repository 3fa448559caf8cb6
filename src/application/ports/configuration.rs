// src/application/ports/configuration.rs
use crate::domain::tree::SluggableConfig;

/// Tree-wide slug configuration, keyed by entity type name.
pub trait SlugConfigurationSource: Send + Sync {
    fn configuration(&self, type_name: &str) -> Option<SluggableConfig>;
    fn configured_types(&self) -> Vec<String>;
}
