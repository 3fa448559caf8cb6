use crate::domain::tree::TreeSlugEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: i64,
    pub type_name: String,
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<SlugChangeDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugChangeDto {
    pub id: i64,
    #[serde(default)]
    pub previous: Option<String>,
    pub slug: String,
    #[serde(default)]
    pub propagated: Vec<i64>,
    pub at: DateTime<Utc>,
}

impl From<TreeSlugEvent> for SlugChangeDto {
    fn from(event: TreeSlugEvent) -> Self {
        match event {
            TreeSlugEvent::Built { id, slug, at } => Self {
                id: id.into(),
                previous: None,
                slug,
                propagated: Vec::new(),
                at,
            },
            TreeSlugEvent::Rebuilt {
                id,
                previous,
                slug,
                propagated,
                at,
            } => Self {
                id: id.into(),
                previous: Some(previous),
                slug,
                propagated: propagated.into_iter().map(i64::from).collect(),
                at,
            },
        }
    }
}
