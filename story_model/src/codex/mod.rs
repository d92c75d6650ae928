//! Codex - the story's reference entries (characters, places, items, lore).
//!
//! Entries are matched against prose by name or alias so that prompts only
//! carry the entries a scene actually touches.

mod entry;

pub use entry::*;

use serde::{Deserialize, Serialize};

use crate::entities::EntityId;

/// All codex entries of a novel.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Codex {
    #[serde(default)]
    pub entries: Vec<CodexEntry>,
}

impl Codex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry and return its ID.
    pub fn add_entry(&mut self, entry: CodexEntry) -> EntityId {
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    pub fn get_entry(&self, id: EntityId) -> Option<&CodexEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries of the given kind, in insertion order.
    pub fn entries_of_kind(&self, kind: CodexKind) -> impl Iterator<Item = &CodexEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    /// Entries referenced by `text`, plus every entry marked `always_include`.
    ///
    /// Matching is case-insensitive and requires word boundaries on both sides,
    /// so "Ann" does not match inside "Annex".
    pub fn mentioned_in(&self, text: &str) -> Vec<&CodexEntry> {
        let haystack = text.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.always_include || e.names().any(|n| contains_word(&haystack, &n.to_lowercase())))
            .collect()
    }
}

/// Whole-word search over an already lowercased haystack.
fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.trim().is_empty() {
        return false;
    }

    haystack.match_indices(needle).any(|(start, matched)| {
        let end = start + matched.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
