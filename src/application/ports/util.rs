// src/application/ports/util.rs
use crate::domain::tree::NodeId;

/// Turns free text into one slug segment.
pub trait Transliterator: Send + Sync {
    fn transliterate(&self, text: &str, separator: &str, node: NodeId) -> String;
}
