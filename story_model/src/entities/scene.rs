//! Scene definitions and scene location within a novel.

use serde::{Deserialize, Serialize};

use super::{Act, Chapter, EntityId, Novel};

/// A single scene: the smallest unit of prose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub id: EntityId,
    pub title: String,
    /// The prose written so far.
    #[serde(default)]
    pub full_text: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Scene {
    /// Create a new empty scene with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            title: title.into(),
            full_text: String::new(),
            summary: String::new(),
            labels: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.full_text = text.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }
}

/// A scene together with its position in the story hierarchy.
///
/// Numbers are 1-based. The scene number counts within its chapter, the
/// chapter number counts across the whole novel and the act number counts
/// within the novel.
#[derive(Debug, Clone, Copy)]
pub struct ScenePath<'a> {
    pub scene: &'a Scene,
    pub number: usize,
    pub chapter: Option<(&'a Chapter, usize)>,
    pub act: Option<(&'a Act, usize)>,
    pub novel: Option<&'a Novel>,
}

impl<'a> ScenePath<'a> {
    /// A scene with no known parents.
    pub fn standalone(scene: &'a Scene, number: usize) -> Self {
        Self {
            scene,
            number,
            chapter: None,
            act: None,
            novel: None,
        }
    }
}
