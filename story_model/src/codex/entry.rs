//! Codex entry definitions.

use serde::{Deserialize, Serialize};

use crate::entities::EntityId;

/// Kinds of codex entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodexKind {
    Character,
    Location,
    Item,
    Lore,
    Other,
}

/// A single reference entry in the codex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodexEntry {
    pub id: EntityId,
    pub name: String,
    pub kind: CodexKind,
    #[serde(default)]
    pub description: String,
    /// Alternative names that also count as a mention.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Included in every scene's context regardless of mentions.
    #[serde(default)]
    pub always_include: bool,
}

impl CodexEntry {
    pub fn new(name: impl Into<String>, kind: CodexKind) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            kind,
            description: String::new(),
            aliases: Vec::new(),
            always_include: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn always_included(mut self) -> Self {
        self.always_include = true;
        self
    }

    /// The entry's name followed by its aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}
