use crate::domain::tree::value_objects::NodeId;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSlugEvent {
    Built {
        id: NodeId,
        slug: String,
        at: DateTime<Utc>,
    },
    Rebuilt {
        id: NodeId,
        previous: String,
        slug: String,
        propagated: Vec<NodeId>,
        at: DateTime<Utc>,
    },
}

impl TreeSlugEvent {
    pub fn slug(&self) -> &str {
        match self {
            Self::Built { slug, .. } | Self::Rebuilt { slug, .. } => slug,
        }
    }
}
