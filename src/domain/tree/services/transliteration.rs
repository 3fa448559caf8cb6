use crate::application::ports::util::Transliterator;
use crate::domain::tree::value_objects::NodeId;

/// Transliteration strategy that prefixes the own segment with the parent slug.
///
/// Handed to the slug text generation for a single build; the base
/// transliterator stays untouched.
pub struct ParentPrefixTransliterator<'a> {
    inner: &'a dyn Transliterator,
    parent_slug: &'a str,
    separator: &'a str,
}

impl<'a> ParentPrefixTransliterator<'a> {
    pub fn new(inner: &'a dyn Transliterator, parent_slug: &'a str, separator: &'a str) -> Self {
        Self {
            inner,
            parent_slug,
            separator,
        }
    }
}

impl Transliterator for ParentPrefixTransliterator<'_> {
    fn transliterate(&self, text: &str, separator: &str, node: NodeId) -> String {
        let segment = self.inner.transliterate(text, separator, node);
        if self.parent_slug.is_empty() {
            segment
        } else {
            format!("{}{}{}", self.parent_slug, self.separator, segment)
        }
    }
}
