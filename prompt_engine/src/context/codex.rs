//! Codex assembly - turns the entries relevant to a piece of text into context data.

use story_model::{Codex, CodexEntry, CodexKind};

use super::{ContextMap, ContextValue};

/// Builds the value stored under the `codex` context key.
pub trait CodexAssembler {
    /// Assemble the codex context for the given focus text (usually the scene prose).
    fn assemble(&self, codex: &Codex, focus_text: &str) -> ContextValue;
}

/// Groups the entries mentioned in the focus text by kind.
///
/// Produces a map with `characters`, `locations`, `items`, `lore` and `other`
/// lists of `{name, description, aliases}` maps. Empty groups are omitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct MentionCodexAssembler;

impl MentionCodexAssembler {
    fn group_key(kind: CodexKind) -> &'static str {
        match kind {
            CodexKind::Character => "characters",
            CodexKind::Location => "locations",
            CodexKind::Item => "items",
            CodexKind::Lore => "lore",
            CodexKind::Other => "other",
        }
    }

    fn entry_value(entry: &CodexEntry) -> ContextValue {
        ContextValue::map([
            ("name", ContextValue::from(&entry.name)),
            ("description", ContextValue::from(&entry.description)),
            ("aliases", ContextValue::from(entry.aliases.clone())),
        ])
    }
}

impl CodexAssembler for MentionCodexAssembler {
    fn assemble(&self, codex: &Codex, focus_text: &str) -> ContextValue {
        let mut groups = ContextMap::new();

        for entry in codex.mentioned_in(focus_text) {
            let group = groups
                .entry(Self::group_key(entry.kind).to_string())
                .or_insert_with(|| ContextValue::List(Vec::new()));
            if let ContextValue::List(items) = group {
                items.push(Self::entry_value(entry));
            }
        }

        ContextValue::Map(groups)
    }
}
