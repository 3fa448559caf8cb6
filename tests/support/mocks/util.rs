// tests/support/mocks/util.rs
use slug_tree::application::ports::util::Transliterator;
use slug_tree::domain::tree::NodeId;

/// Lowercases and joins words with the separator; no transliteration.
#[derive(Clone)]
pub struct DummyTransliterator;

impl Transliterator for DummyTransliterator {
    fn transliterate(&self, text: &str, separator: &str, _node: NodeId) -> String {
        text.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Keeps case, so case-insensitive prefix matching can be observed.
#[derive(Clone)]
pub struct UppercaseTransliterator;

impl Transliterator for UppercaseTransliterator {
    fn transliterate(&self, text: &str, separator: &str, _node: NodeId) -> String {
        text.split_whitespace()
            .map(str::to_uppercase)
            .collect::<Vec<_>>()
            .join(separator)
    }
}
