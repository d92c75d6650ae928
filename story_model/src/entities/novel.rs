//! Novel, act and chapter definitions.

use serde::{Deserialize, Serialize};

use super::{EntityId, Scene, ScenePath, User};

const DEFAULT_TENSE: &str = "past";
const DEFAULT_LANGUAGE: &str = "English";
const UNKNOWN_AUTHOR: &str = "Unknown";

/// A novel: the root of the story hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Novel {
    pub id: EntityId,
    pub title: String,
    /// Name shown as the author, overrides the owner's name.
    pub pen_name: Option<String>,
    pub owner: Option<User>,
    #[serde(default)]
    pub outline: String,
    pub tense: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub acts: Vec<Act>,
}

impl Novel {
    /// Create a new novel with the given title and no content.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            title: title.into(),
            pen_name: None,
            owner: None,
            outline: String::new(),
            tense: None,
            language: None,
            acts: Vec::new(),
        }
    }

    pub fn with_owner(mut self, owner: User) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_pen_name(mut self, pen_name: impl Into<String>) -> Self {
        self.pen_name = Some(pen_name.into());
        self
    }

    pub fn with_act(mut self, act: Act) -> Self {
        self.acts.push(act);
        self
    }

    /// Display author: pen name, then the owner's name, then "Unknown".
    pub fn author(&self) -> &str {
        self.pen_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.owner.as_ref().map(|u| u.name.as_str()))
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Narrative tense, "past" when unset.
    pub fn tense(&self) -> &str {
        self.tense.as_deref().unwrap_or(DEFAULT_TENSE)
    }

    /// Prose language, "English" when unset.
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Iterate over every chapter in reading order.
    pub fn chapters(&self) -> impl Iterator<Item = &Chapter> {
        self.acts.iter().flat_map(|a| a.chapters.iter())
    }

    /// Iterate over every scene in reading order.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.chapters().flat_map(|c| c.scenes.iter())
    }

    /// Find a scene and its numbered parents.
    pub fn locate_scene(&self, scene_id: EntityId) -> Option<ScenePath<'_>> {
        let mut chapter_number = 0;
        for (act_index, act) in self.acts.iter().enumerate() {
            for chapter in &act.chapters {
                chapter_number += 1;
                if let Some(index) = chapter.scenes.iter().position(|s| s.id == scene_id) {
                    return Some(ScenePath {
                        scene: &chapter.scenes[index],
                        number: index + 1,
                        chapter: Some((chapter, chapter_number)),
                        act: Some((act, act_index + 1)),
                        novel: Some(self),
                    });
                }
            }
        }
        None
    }
}

/// A top-level division of a novel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Act {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl Act {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            chapters: Vec::new(),
        }
    }

    pub fn with_chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }
}

/// A chapter, holding scenes in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl Chapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            scenes: Vec::new(),
        }
    }

    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scenes.push(scene);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_novel() -> Novel {
        Novel::new("The Tempest Road")
            .with_act(
                Act::new("Departure")
                    .with_chapter(Chapter::new("The Harbor").with_scene(Scene::new("Fog")))
                    .with_chapter(
                        Chapter::new("Open Water")
                            .with_scene(Scene::new("Calm"))
                            .with_scene(Scene::new("Storm")),
                    ),
            )
            .with_act(
                Act::new("Return").with_chapter(Chapter::new("Landfall").with_scene(Scene::new("Shore"))),
            )
    }

    #[test]
    fn test_author_fallbacks() {
        let novel = Novel::new("Untitled");
        assert_eq!(novel.author(), "Unknown");

        let novel = novel.with_owner(User::new("Ada"));
        assert_eq!(novel.author(), "Ada");

        let novel = novel.with_pen_name("A. L. Byron");
        assert_eq!(novel.author(), "A. L. Byron");
    }

    #[test]
    fn test_blank_pen_name_falls_back_to_owner() {
        let novel = Novel::new("Untitled")
            .with_owner(User::new("Ada"))
            .with_pen_name("  ");
        assert_eq!(novel.author(), "Ada");
    }

    #[test]
    fn test_tense_and_language_defaults() {
        let mut novel = Novel::new("Untitled");
        assert_eq!(novel.tense(), "past");
        assert_eq!(novel.language(), "English");

        novel.tense = Some("present".to_string());
        novel.language = Some("German".to_string());
        assert_eq!(novel.tense(), "present");
        assert_eq!(novel.language(), "German");
    }

    #[test]
    fn test_locate_scene_numbers() {
        let novel = sample_novel();
        let storm = novel.scenes().find(|s| s.title == "Storm").unwrap().id;

        let path = novel.locate_scene(storm).unwrap();
        assert_eq!(path.scene.title, "Storm");
        assert_eq!(path.number, 2);

        let (chapter, chapter_number) = path.chapter.unwrap();
        assert_eq!(chapter.name, "Open Water");
        assert_eq!(chapter_number, 2);

        let (act, act_number) = path.act.unwrap();
        assert_eq!(act.name, "Departure");
        assert_eq!(act_number, 1);
        assert!(path.novel.is_some());
    }

    #[test]
    fn test_chapter_numbers_continue_across_acts() {
        let novel = sample_novel();
        let shore = novel.scenes().find(|s| s.title == "Shore").unwrap().id;

        let path = novel.locate_scene(shore).unwrap();
        assert_eq!(path.chapter.unwrap().1, 3);
        assert_eq!(path.act.unwrap().1, 2);
    }

    #[test]
    fn test_locate_missing_scene() {
        let novel = sample_novel();
        assert!(novel.locate_scene(EntityId::new()).is_none());
    }
}
