//! Prompt context - the structured story data variables resolve against.
//!
//! A context is a map of top-level keys (`scene`, `chapter`, `act`, `novel`,
//! `codex`, `inputs`, and free-form keys such as `textBefore`) built fresh for
//! every resolution. Builders replace whole top-level keys; nothing is deep
//! merged.

mod codex;
mod value;

pub use codex::*;
pub use value::*;

use serde::{Deserialize, Serialize};
use story_model::{Novel, ScenePath};

/// Context data for a single resolution call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptContext {
    root: ContextMap,
}

impl PromptContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON object. Non-object values yield an empty context.
    pub fn from_json(value: serde_json::Value) -> Self {
        match ContextValue::from(value) {
            ContextValue::Map(root) => Self { root },
            _ => Self::default(),
        }
    }

    /// Set a top-level key, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.root.insert(key.into(), value.into());
    }

    /// Builder form of [`PromptContext::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Get a top-level value.
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.root.get(key)
    }

    /// Walk a path of keys from the root.
    ///
    /// Fails as soon as a segment is missing or the current value is not a map.
    pub fn lookup<'p>(&self, path: impl IntoIterator<Item = &'p str>) -> Option<&ContextValue> {
        let mut segments = path.into_iter();
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(current)
    }

    pub fn root(&self) -> &ContextMap {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Add scene data, plus chapter, act and novel data when the scene has those parents.
    pub fn with_scene(mut self, path: &ScenePath<'_>) -> Self {
        let scene = path.scene;
        self.set(
            "scene",
            ContextValue::map([
                ("title", ContextValue::from(&scene.title)),
                ("fullText", ContextValue::from(&scene.full_text)),
                ("summary", ContextValue::from(&scene.summary)),
                ("labels", ContextValue::from(scene.labels.clone())),
                ("number", ContextValue::from(path.number)),
            ]),
        );

        if let Some((chapter, number)) = path.chapter {
            self.set(
                "chapter",
                ContextValue::map([
                    ("name", ContextValue::from(&chapter.name)),
                    ("number", ContextValue::from(number)),
                ]),
            );
        }

        if let Some((act, number)) = path.act {
            self.set(
                "act",
                ContextValue::map([
                    ("name", ContextValue::from(&act.name)),
                    ("number", ContextValue::from(number)),
                ]),
            );
        }

        if let Some(novel) = path.novel {
            self.set(
                "novel",
                ContextValue::map([
                    ("title", novel.title.as_str()),
                    ("author", novel.author()),
                    ("tense", novel.tense()),
                    ("language", novel.language()),
                ]),
            );
        }

        self
    }

    /// Add novel data, including the outline.
    pub fn with_novel(mut self, novel: &Novel) -> Self {
        self.set(
            "novel",
            ContextValue::map([
                ("title", novel.title.as_str()),
                ("author", novel.author()),
                ("outline", novel.outline.as_str()),
                ("tense", novel.tense()),
                ("language", novel.language()),
            ]),
        );
        self
    }

    /// Add the codex entries relevant to `focus_text` under the `codex` key.
    pub fn with_codex(
        mut self,
        assembler: &dyn CodexAssembler,
        codex: &story_model::Codex,
        focus_text: &str,
    ) -> Self {
        self.set("codex", assembler.assemble(codex, focus_text));
        self
    }

    /// Add user-supplied template inputs, read by `{input(name)}`.
    pub fn with_inputs<K, V>(mut self, inputs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ContextValue>,
    {
        self.set("inputs", ContextValue::map(inputs));
        self
    }
}
