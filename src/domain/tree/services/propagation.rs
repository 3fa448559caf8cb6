// src/domain/tree/services/propagation.rs
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::tree::repository::UnitOfWork;
use crate::domain::tree::value_objects::NodeId;
use regex::{NoExpand, Regex, RegexBuilder};

/// Rewrites the `<old><separator>` prefix of descendant slugs.
#[derive(Debug, Clone)]
pub struct PrefixRewrite {
    pattern: Regex,
    prefix: String,
    replacement: String,
}

impl PrefixRewrite {
    pub fn new(old_slug: &str, new_slug: &str, separator: &str) -> DomainResult<Self> {
        let source = format!(
            "^{}{}",
            regex::escape(old_slug),
            regex::escape(separator)
        );
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .multi_line(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|err| DomainError::Validation(format!("invalid slug prefix: {err}")))?;

        Ok(Self {
            pattern,
            prefix: format!("{old_slug}{separator}"),
            replacement: format!("{new_slug}{separator}"),
        })
    }

    /// The `<old><separator>` text being replaced.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn matches(&self, slug: &str) -> bool {
        self.pattern.is_match(slug)
    }

    /// Returns the rewritten slug, or `None` when nothing would change.
    pub fn apply(&self, slug: &str) -> Option<String> {
        if !self.matches(slug) {
            return None;
        }
        let rewritten = self
            .pattern
            .replace_all(slug, NoExpand(&self.replacement))
            .into_owned();
        (rewritten != slug).then_some(rewritten)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    pub rewritten: Vec<NodeId>,
    pub skipped_proxies: Vec<NodeId>,
}

impl PropagationReport {
    pub fn is_empty(&self) -> bool {
        self.rewritten.is_empty()
    }
}

/// Apply `rewrite` to every object of `root_type`.
///
/// The unit of work first rewrites the stored slugs in bulk, which covers
/// proxies and anything not loaded. Materialized objects are then rewritten
/// in memory; both the live value and the tracked original are updated, so
/// the next flush does not see them as pending changes.
pub fn propagate<U: UnitOfWork + ?Sized>(
    uow: &mut U,
    root_type: &str,
    slug_field: &str,
    rewrite: &PrefixRewrite,
) -> DomainResult<PropagationReport> {
    let mut report = PropagationReport::default();
    uow.replace_relative(root_type, slug_field, rewrite)?;

    for id in uow.loaded_objects(root_type) {
        if !uow.is_initialized(id) {
            tracing::trace!(node = %id, "skipping uninitialized proxy");
            report.skipped_proxies.push(id);
            continue;
        }
        let Some(current) = uow.read_text(id, slug_field) else {
            continue;
        };
        let Some(rewritten) = rewrite.apply(&current) else {
            continue;
        };

        tracing::debug!(node = %id, from = %current, to = %rewritten, "rewriting descendant slug");
        uow.write_text(id, slug_field, rewritten.clone())?;
        uow.set_tracked_original_value(id, slug_field, rewritten)?;
        report.rewritten.push(id);
    }

    Ok(report)
}
