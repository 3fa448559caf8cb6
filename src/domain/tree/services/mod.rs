// src/domain/tree/services/mod.rs
pub mod propagation;
pub mod transliteration;

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::ports::configuration::SlugConfigurationSource;
use crate::application::ports::util::Transliterator;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::tree::options::{
    HandlerOptions, OptionCache, PARENT_RELATION_FIELD_KEY, TREE_HANDLER, TreeSlugOptions,
    sluggable_config_for,
};
use crate::domain::tree::repository::{ObjectManager, TypeMetadata, UnitOfWork};
use crate::domain::tree::value_objects::NodeId;

pub use propagation::{PrefixRewrite, PropagationReport};
pub use transliteration::ParentPrefixTransliterator;

/// Per-node state between the change decision and the slug completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationContext {
    pub is_insert: bool,
    pub parent_slug: String,
    pub separator: String,
}

/// Slug handler that keeps slugs of tree-shaped entities prefixed by the
/// slug of their parent and rewrites loaded descendants when a slug changes.
pub struct TreeSlugHandler {
    configuration: Arc<dyn SlugConfigurationSource>,
    metadata: Arc<dyn TypeMetadata>,
    options: OptionCache,
    contexts: HashMap<NodeId, PropagationContext>,
}

impl TreeSlugHandler {
    pub fn new(
        configuration: Arc<dyn SlugConfigurationSource>,
        metadata: Arc<dyn TypeMetadata>,
    ) -> Self {
        Self {
            configuration,
            metadata,
            options: OptionCache::default(),
            contexts: HashMap::new(),
        }
    }

    /// Check the declared tree options of `type_name` against its metadata.
    pub fn validate(
        options: &HandlerOptions,
        type_name: &str,
        metadata: &dyn TypeMetadata,
    ) -> DomainResult<()> {
        let resolved = TreeSlugOptions::from_handler_options(type_name, options)?;
        let field = resolved.parent_relation_field.as_str();
        if !metadata.is_single_valued_association(type_name, field) {
            return Err(DomainError::invalid_mapping(
                type_name,
                field,
                "unable to find tree parent slug relation through this field",
            ));
        }
        if resolved.separator.is_empty() {
            return Err(DomainError::invalid_mapping(
                type_name,
                "separator",
                "tree path separator cannot be empty",
            ));
        }
        Ok(())
    }

    pub fn options(&mut self, type_name: &str) -> DomainResult<Arc<TreeSlugOptions>> {
        if let Some(options) = self.options.get(type_name) {
            return Ok(options);
        }

        let config = sluggable_config_for(
            self.configuration.as_ref(),
            self.metadata.as_ref(),
            type_name,
        )?
        .ok_or_else(|| {
            DomainError::invalid_mapping(type_name, TREE_HANDLER, "type is not sluggable")
        })?;
        let declared = config.tree_options().ok_or_else(|| {
            DomainError::invalid_mapping(
                type_name,
                PARENT_RELATION_FIELD_KEY,
                "no tree slug handler configured",
            )
        })?;
        let resolved = TreeSlugOptions::from_handler_options(type_name, declared)?;
        tracing::debug!(type_name, separator = %resolved.separator, "resolved tree slug options");
        Ok(self.options.insert(type_name, resolved))
    }

    pub const fn option_cache(&self) -> &OptionCache {
        &self.options
    }

    pub fn context(&self, node: NodeId) -> Option<&PropagationContext> {
        self.contexts.get(&node)
    }

    /// Drop the context of a build that ends without a slug completion.
    pub fn discard(&mut self, node: NodeId) {
        self.contexts.remove(&node);
    }

    /// Decide whether the slug of `node` needs to be rebuilt because its
    /// parent reference changed. New nodes are left to the caller, which
    /// always builds their slug.
    pub fn on_change_decision<O: ObjectManager + ?Sized>(
        &mut self,
        om: &O,
        node: NodeId,
        current_slug: &str,
        needs_change: bool,
    ) -> DomainResult<bool> {
        let is_insert = om.is_newly_created(node);
        self.contexts.insert(
            node,
            PropagationContext {
                is_insert,
                ..PropagationContext::default()
            },
        );

        if is_insert || needs_change {
            return Ok(needs_change);
        }

        let type_name = om.type_of(node)?;
        let options = self.options(&type_name)?;
        let parent_changed = om
            .pending_field_changes(node)
            .contains(&options.parent_relation_field);
        if parent_changed {
            tracing::debug!(node = %node, current_slug, "parent relation changed; slug needs rebuild");
        }
        Ok(parent_changed)
    }

    /// Resolve options and the parent slug right before slug text generation.
    pub fn post_slug_build<O: ObjectManager + ?Sized>(
        &mut self,
        om: &mut O,
        node: NodeId,
        slug_field: &str,
    ) -> DomainResult<()> {
        let type_name = om.type_of(node)?;
        let options = self.options(&type_name)?;

        let parent_slug = match om.resolve_reference(node, &options.parent_relation_field)? {
            Some(parent) => om.read_text(parent, slug_field).unwrap_or_default(),
            None => String::new(),
        };

        let is_insert = om.is_newly_created(node);
        let context = self
            .contexts
            .entry(node)
            .or_insert_with(|| PropagationContext {
                is_insert,
                ..PropagationContext::default()
            });
        context.parent_slug = parent_slug;
        context.separator.clone_from(&options.separator);
        Ok(())
    }

    /// Transliteration strategy for the build prepared by [`Self::post_slug_build`].
    pub fn transliterator_for<'a>(
        &'a self,
        node: NodeId,
        base: &'a dyn Transliterator,
    ) -> DomainResult<ParentPrefixTransliterator<'a>> {
        let context = self.contexts.get(&node).ok_or_else(|| {
            DomainError::Validation(format!("slug build for node {node} was not prepared"))
        })?;
        Ok(ParentPrefixTransliterator::new(
            base,
            &context.parent_slug,
            &context.separator,
        ))
    }

    /// Propagate the new slug of an updated node to its loaded descendants.
    ///
    /// Must run before the new slug is written to `node`: the value still held
    /// in `slug_field` is the prefix being replaced.
    pub fn on_slug_completion<O: ObjectManager + ?Sized>(
        &mut self,
        om: &mut O,
        node: NodeId,
        slug_field: &str,
        new_slug: &str,
    ) -> DomainResult<PropagationReport> {
        let context = self.contexts.remove(&node).unwrap_or_else(|| PropagationContext {
            is_insert: om.is_newly_created(node),
            ..PropagationContext::default()
        });
        if context.is_insert {
            return Ok(PropagationReport::default());
        }

        let type_name = om.type_of(node)?;
        let options = self.options(&type_name)?;
        let separator = if context.separator.is_empty() {
            options.separator.as_str()
        } else {
            context.separator.as_str()
        };

        let target = om.read_text(node, slug_field).unwrap_or_default();
        if target.is_empty() || target == new_slug {
            return Ok(PropagationReport::default());
        }

        let root_type = self.metadata.root_type_name(&type_name)?;
        let rewrite = PrefixRewrite::new(&target, new_slug, separator)?;
        let report = propagation::propagate(om, &root_type, slug_field, &rewrite)?;

        tracing::info!(
            node = %node,
            from = %target,
            to = %new_slug,
            rewritten = report.rewritten.len(),
            skipped_proxies = report.skipped_proxies.len(),
            "propagated slug change to loaded descendants"
        );
        Ok(report)
    }
}

/// Whether any of `fields` differs from its tracked original.
pub fn has_pending_change<U: UnitOfWork + ?Sized>(uow: &U, node: NodeId, fields: &[String]) -> bool {
    let pending = uow.pending_field_changes(node);
    fields.iter().any(|field| pending.contains(field))
}
