//! Template engine - the caller-facing entry point.
//!
//! Resolution alternates component expansion and variable resolution in one
//! bounded loop. `{include(name)}` produces `[[name]]`, which the next round
//! expands, so the two syntaxes interleave until no include is pending or the
//! depth ceiling is reached.

use story_model::{Codex, EntityId, Novel};

use crate::clock::{Clock, SystemClock};
use crate::component::{self, ComponentExpander, ComponentRegistry};
use crate::config::EngineConfig;
use crate::context::{CodexAssembler, MentionCodexAssembler, PromptContext};
use crate::resolver::{ResolvedPiece, VariableResolver};

/// Output span of a resolution round.
#[derive(Debug)]
enum Segment {
    /// Template or component text still to be expanded and resolved.
    Pending(String),
    Settled(String),
}

impl Segment {
    fn is_pending(&self) -> bool {
        matches!(self, Segment::Pending(_))
    }

    fn into_text(self) -> String {
        match self {
            Segment::Pending(text) | Segment::Settled(text) => text,
        }
    }
}

/// Expands and resolves prompt templates.
#[derive(Debug)]
pub struct TemplateEngine {
    config: EngineConfig,
    expander: ComponentExpander,
    resolver: VariableResolver,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl TemplateEngine {
    /// Create an engine using the system clock.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// Create an engine with a specific date source.
    pub fn with_clock(config: EngineConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            expander: ComponentExpander::new(config.max_depth),
            resolver: VariableResolver::with_clock(&config, clock),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fully resolve a template: components, then variables, repeated on the
    /// content of components pulled in by `include()`.
    ///
    /// Only template and component text is ever expanded or resolved. Values
    /// substituted from the context are final, even if they contain marker syntax.
    pub fn resolve(
        &self,
        template: &str,
        ctx: &PromptContext,
        registry: &ComponentRegistry<'_>,
    ) -> String {
        let mut segments = vec![Segment::Pending(template.to_string())];

        for round in 1..=self.config.max_depth {
            if !segments.iter().any(Segment::is_pending) {
                break;
            }

            segments = segments
                .into_iter()
                .flat_map(|segment| match segment {
                    Segment::Pending(text) => self.resolve_round(&text, ctx, registry),
                    settled => vec![settled],
                })
                .collect();
            tracing::debug!(round, segments = segments.len(), "resolution round complete");
        }

        if segments.iter().any(Segment::is_pending) {
            tracing::warn!(
                max_depth = self.config.max_depth,
                "resolution round ceiling reached with includes left"
            );
        }

        segments.into_iter().map(Segment::into_text).collect()
    }

    /// Expand and resolve one pending span. Includes of known components stay
    /// pending for the next round; unknown ones settle as `[[name]]`.
    fn resolve_round(
        &self,
        text: &str,
        ctx: &PromptContext,
        registry: &ComponentRegistry<'_>,
    ) -> Vec<Segment> {
        let expanded = self.expander.expand(text, registry);
        self.resolver
            .resolve_pieces(&expanded, ctx)
            .into_iter()
            .map(|piece| match piece {
                ResolvedPiece::Include(name) if registry.contains(&name) => {
                    Segment::Pending(format!("[[{}]]", name))
                }
                piece => Segment::Settled(piece.into_text()),
            })
            .collect()
    }

    /// Resolve variables and functions only. Component markers are left as they are.
    pub fn resolve_text(&self, template: &str, ctx: &PromptContext) -> String {
        self.resolver.resolve(template, ctx)
    }

    /// Expand components only.
    pub fn expand_components(&self, template: &str, registry: &ComponentRegistry<'_>) -> String {
        self.expander.expand(template, registry)
    }

    /// Component names the template references.
    pub fn referenced_component_names(&self, template: &str) -> Vec<String> {
        component::referenced_names(template)
    }

    /// Component names the template references that the registry cannot resolve.
    pub fn missing_component_names(
        &self,
        template: &str,
        registry: &ComponentRegistry<'_>,
    ) -> Vec<String> {
        component::missing_names(template, registry)
    }

    /// Check a template before it is saved or sent.
    ///
    /// Returns the missing component names as warnings; a non-empty list
    /// does not stop the template from being used.
    pub fn validate_template(&self, template: &str, registry: &ComponentRegistry<'_>) -> Vec<String> {
        let missing = self.missing_component_names(template, registry);
        if !missing.is_empty() {
            tracing::warn!(?missing, "template references unknown components");
        }
        missing
    }

    /// Build the context for a scene of `novel`: scene, chapter, act, novel
    /// (with outline) and the codex entries mentioned in the scene.
    pub fn scene_context(&self, novel: &Novel, scene_id: EntityId, codex: &Codex) -> Option<PromptContext> {
        self.scene_context_with(novel, scene_id, codex, &MentionCodexAssembler)
    }

    /// [`TemplateEngine::scene_context`] with a custom codex assembler.
    pub fn scene_context_with(
        &self,
        novel: &Novel,
        scene_id: EntityId,
        codex: &Codex,
        assembler: &dyn CodexAssembler,
    ) -> Option<PromptContext> {
        let path = novel.locate_scene(scene_id)?;
        Some(
            PromptContext::new()
                .with_scene(&path)
                .with_novel(novel)
                .with_codex(assembler, codex, &path.scene.full_text),
        )
    }
}
