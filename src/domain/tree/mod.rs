pub mod entity;
pub mod events;
pub mod options;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use entity::{Changeset, FieldChange, FieldValue, Node, RelativeReplacement};
pub use events::TreeSlugEvent;
pub use options::{OptionCache, SluggableConfig, TreeSlugOptions};
pub use repository::{
    AssociationResolver, NodeWriteRepository, ObjectManager, TypeMetadata, UnitOfWork,
};
pub use value_objects::NodeId;
