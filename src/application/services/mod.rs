// src/application/services/mod.rs
use std::sync::Arc;

use crate::{
    application::{
        error::{ApplicationError, ApplicationResult},
        ports::{ClockPort, SlugConfigurationPort, TransliteratorPort, util::Transliterator},
    },
    domain::tree::{
        NodeId, ObjectManager, SluggableConfig, TreeSlugEvent, TypeMetadata,
        options::sluggable_config_for,
        services::{PropagationReport, TreeSlugHandler, has_pending_change},
    },
};

/// Drives the slug lifecycle of one node at a time: change decision, slug
/// build, descendant propagation and the final write of the slug field.
pub struct SlugLifecycleService {
    handler: TreeSlugHandler,
    configuration: Arc<SlugConfigurationPort>,
    metadata: Arc<dyn TypeMetadata>,
    transliterator: Arc<TransliteratorPort>,
    clock: Arc<ClockPort>,
}

impl SlugLifecycleService {
    /// Validates every tree declaration up front; a bad mapping aborts setup.
    pub fn new(
        configuration: Arc<SlugConfigurationPort>,
        metadata: Arc<dyn TypeMetadata>,
        transliterator: Arc<TransliteratorPort>,
        clock: Arc<ClockPort>,
    ) -> ApplicationResult<Self> {
        for type_name in configuration.configured_types() {
            let Some(config) = configuration.configuration(&type_name) else {
                continue;
            };
            if !metadata.has_field(&type_name, &config.slug_field) {
                return Err(ApplicationError::validation(format!(
                    "slug field `{}` is not declared on `{type_name}`",
                    config.slug_field
                )));
            }
            if let Some(options) = config.tree_options() {
                TreeSlugHandler::validate(options, &type_name, metadata.as_ref())?;
            }
        }

        let handler = TreeSlugHandler::new(Arc::clone(&configuration), Arc::clone(&metadata));
        Ok(Self {
            handler,
            configuration,
            metadata,
            transliterator,
            clock,
        })
    }

    pub const fn handler(&self) -> &TreeSlugHandler {
        &self.handler
    }

    pub fn config_for(&self, type_name: &str) -> ApplicationResult<SluggableConfig> {
        sluggable_config_for(
            self.configuration.as_ref(),
            self.metadata.as_ref(),
            type_name,
        )?
        .ok_or_else(|| ApplicationError::validation(format!("type `{type_name}` is not sluggable")))
    }

    /// Tree parent field of `type_name`, or `None` for types without a tree
    /// slug handler.
    pub fn parent_relation_field(&mut self, type_name: &str) -> ApplicationResult<Option<String>> {
        if self.config_for(type_name)?.tree_options().is_none() {
            return Ok(None);
        }
        let options = self.handler.options(type_name)?;
        Ok(Some(options.parent_relation_field.clone()))
    }

    /// Rebuild the slug of `node` if anything slug-affecting changed.
    ///
    /// Returns `None` when the node is up to date.
    pub fn refresh_slug<O: ObjectManager + ?Sized>(
        &mut self,
        om: &mut O,
        node: NodeId,
    ) -> ApplicationResult<Option<TreeSlugEvent>> {
        let result = self.rebuild_slug(om, node);
        self.handler.discard(node);
        result
    }

    fn rebuild_slug<O: ObjectManager + ?Sized>(
        &mut self,
        om: &mut O,
        node: NodeId,
    ) -> ApplicationResult<Option<TreeSlugEvent>> {
        let type_name = om.type_of(node)?;
        let config = self.config_for(&type_name)?;
        let is_tree = config.tree_options().is_some();

        let current = om.read_text(node, &config.slug_field).unwrap_or_default();
        let is_new = om.is_newly_created(node);
        let mut needs_change =
            is_new || current.is_empty() || has_pending_change(&*om, node, &config.source_fields);

        if is_tree {
            needs_change = self
                .handler
                .on_change_decision(&*om, node, &current, needs_change)?;
        }
        if !needs_change {
            tracing::debug!(node = %node, "slug is up to date");
            return Ok(None);
        }

        let text = config
            .source_fields
            .iter()
            .filter_map(|field| om.read_text(node, field))
            .collect::<Vec<_>>()
            .join(" ");

        let slug = if is_tree {
            self.handler.post_slug_build(om, node, &config.slug_field)?;
            self.handler
                .transliterator_for(node, self.transliterator.as_ref())?
                .transliterate(&text, &config.word_separator, node)
        } else {
            self.transliterator
                .transliterate(&text, &config.word_separator, node)
        };

        if slug.is_empty() {
            return Err(ApplicationError::validation(format!(
                "source fields of node {node} produce an empty slug"
            )));
        }

        let report = if is_tree {
            self.handler
                .on_slug_completion(om, node, &config.slug_field, &slug)?
        } else {
            PropagationReport::default()
        };

        om.write_text(node, &config.slug_field, slug.clone())?;
        let at = self.clock.now();

        let event = if is_new || current.is_empty() {
            TreeSlugEvent::Built { id: node, slug, at }
        } else {
            TreeSlugEvent::Rebuilt {
                id: node,
                previous: current,
                slug,
                propagated: report.rewritten,
                at,
            }
        };
        tracing::debug!(node = %node, slug = event.slug(), "slug refreshed");
        Ok(Some(event))
    }
}
