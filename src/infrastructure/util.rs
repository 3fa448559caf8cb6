use crate::application::ports::util::Transliterator;
use crate::domain::tree::NodeId;
use slug::slugify;

/// ASCII transliteration backed by the `slug` crate.
#[derive(Default, Clone)]
pub struct DefaultTransliterator;

impl Transliterator for DefaultTransliterator {
    fn transliterate(&self, text: &str, separator: &str, _node: NodeId) -> String {
        let slug = slugify(text);
        if separator == "-" {
            slug
        } else {
            slug.replace('-', separator)
        }
    }
}
