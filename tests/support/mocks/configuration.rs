// tests/support/mocks/configuration.rs
use std::sync::atomic::{AtomicUsize, Ordering};

use slug_tree::application::ports::configuration::SlugConfigurationSource;
use slug_tree::domain::tree::SluggableConfig;
use slug_tree::infrastructure::configuration::JsonSlugConfiguration;

/// Wraps a configuration and counts lookups.
pub struct CountingConfiguration {
    inner: JsonSlugConfiguration,
    lookups: AtomicUsize,
}

impl CountingConfiguration {
    pub fn new(inner: JsonSlugConfiguration) -> Self {
        Self {
            inner,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl SlugConfigurationSource for CountingConfiguration {
    fn configuration(&self, type_name: &str) -> Option<SluggableConfig> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.configuration(type_name)
    }

    fn configured_types(&self) -> Vec<String> {
        self.inner.configured_types()
    }
}
