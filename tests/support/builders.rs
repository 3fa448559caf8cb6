// tests/support/builders.rs
use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::json;

use slug_tree::application::commands::nodes::{
    CreateNodeCommand, NodeCommandService, UpdateNodeCommand,
};
use slug_tree::application::ports::configuration::SlugConfigurationSource;
use slug_tree::application::services::SlugLifecycleService;
use slug_tree::domain::tree::{Node, NodeId, SluggableConfig, TypeMetadata, UnitOfWork};
use slug_tree::infrastructure::configuration::JsonSlugConfiguration;
use slug_tree::infrastructure::metadata::{FieldKind, TypeDescriptor, TypeRegistry};
use slug_tree::infrastructure::unit_of_work::InMemoryUnitOfWork;
use slug_tree::infrastructure::util::DefaultTransliterator;

use super::mocks::DummyClock;

static REGISTRY: Lazy<Arc<TypeRegistry>> = Lazy::new(|| Arc::new(catalog_registry()));

pub fn catalog_registry() -> TypeRegistry {
    TypeRegistry::default()
        .with_type(
            "Category",
            TypeDescriptor::default()
                .field("title", FieldKind::Scalar)
                .field("slug", FieldKind::Scalar)
                .field("parent", FieldKind::SingleValued("Category".into()))
                .field("children", FieldKind::Collection("Category".into())),
        )
        .with_type(
            "Shelf",
            TypeDescriptor::extending("Category").field("aisle", FieldKind::Scalar),
        )
        .with_type(
            "Tag",
            TypeDescriptor::default()
                .field("name", FieldKind::Scalar)
                .field("slug", FieldKind::Scalar),
        )
}

pub fn metadata() -> Arc<dyn TypeMetadata> {
    let registry: Arc<TypeRegistry> = Arc::clone(&*REGISTRY);
    registry
}

pub fn tree_config(separator: &str) -> SluggableConfig {
    serde_json::from_value(json!({
        "slugField": "slug",
        "sourceFields": ["title"],
        "handlers": { "tree": { "parentRelationField": "parent", "separator": separator } }
    }))
    .expect("valid tree config")
}

pub fn tag_config() -> SluggableConfig {
    serde_json::from_value(json!({
        "slugField": "slug",
        "sourceFields": ["name"],
        "wordSeparator": "_"
    }))
    .expect("valid tag config")
}

pub fn catalog_configuration() -> JsonSlugConfiguration {
    JsonSlugConfiguration::default()
        .with_type("Category", tree_config("/"))
        .with_type("Tag", tag_config())
}

pub fn lifecycle_with(configuration: Arc<dyn SlugConfigurationSource>) -> SlugLifecycleService {
    SlugLifecycleService::new(
        configuration,
        metadata(),
        Arc::new(DefaultTransliterator),
        Arc::new(DummyClock),
    )
    .expect("valid slug configuration")
}

pub fn command_service() -> NodeCommandService {
    command_service_with(catalog_configuration())
}

pub fn command_service_with(configuration: JsonSlugConfiguration) -> NodeCommandService {
    NodeCommandService::new(lifecycle_with(Arc::new(configuration)), metadata())
}

pub fn unit_of_work() -> InMemoryUnitOfWork {
    InMemoryUnitOfWork::new(metadata())
}

pub fn create(id: i64, type_name: &str, title: &str, parent: Option<i64>) -> CreateNodeCommand {
    let mut references = BTreeMap::new();
    if type_name != "Tag" {
        references.insert("parent".to_string(), parent);
    }
    let label_field = if type_name == "Tag" { "name" } else { "title" };
    CreateNodeCommand {
        id,
        type_name: type_name.into(),
        text: BTreeMap::from([(label_field.to_string(), title.to_string())]),
        references,
    }
}

pub fn rename(id: i64, title: &str) -> UpdateNodeCommand {
    UpdateNodeCommand {
        id,
        text: BTreeMap::from([("title".to_string(), title.to_string())]),
        ..UpdateNodeCommand::default()
    }
}

pub fn reparent(id: i64, parent: Option<i64>) -> UpdateNodeCommand {
    UpdateNodeCommand {
        id,
        references: BTreeMap::from([("parent".to_string(), parent)]),
        ..UpdateNodeCommand::default()
    }
}

pub fn slug_of(uow: &InMemoryUnitOfWork, id: i64) -> String {
    uow.read_text(NodeId(id), "slug").unwrap_or_default()
}

/// Registers already-persisted categories, as if loaded from storage.
pub struct TreeBuilder {
    uow: InMemoryUnitOfWork,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            uow: unit_of_work(),
        }
    }

    pub fn node(mut self, id: i64, title: &str, slug: &str, parent: Option<i64>) -> Self {
        self.uow
            .register_managed(category(id, title, slug, parent))
            .expect("register node");
        self
    }

    pub fn proxy(mut self, id: i64, title: &str, slug: &str, parent: Option<i64>) -> Self {
        self.uow
            .register_proxy(category(id, title, slug, parent))
            .expect("register proxy");
        self
    }

    pub fn build(self) -> InMemoryUnitOfWork {
        self.uow
    }
}

fn category(id: i64, title: &str, slug: &str, parent: Option<i64>) -> Node {
    Node::new(NodeId(id), "Category")
        .with_text("title", title)
        .with_text("slug", slug)
        .with_reference("parent", parent.map(NodeId))
}

/// food > fruits > apples, plus look-alike roots that must never be touched.
pub fn food_tree() -> InMemoryUnitOfWork {
    TreeBuilder::new()
        .node(1, "Food", "food", None)
        .node(2, "Fruits", "food/fruits", Some(1))
        .node(3, "Apples", "food/fruits/apples", Some(2))
        .node(4, "Seafood", "seafood", None)
        .node(5, "Foods", "foods", None)
        .node(6, "Bread", "foods/bread", Some(5))
        .build()
}
