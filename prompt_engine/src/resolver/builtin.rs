//! Built-in template functions.

use regex::Regex;
use std::sync::LazyLock;

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid markup tag regex"));

/// Word count used by `firstWords`/`lastWords` when no count is given.
pub const DEFAULT_WORD_COUNT: usize = 100;

/// The closed set of functions a template can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    TextBefore,
    TextAfter,
    StorySoFar,
    StoryToCome,
    Message,
    Content,
    NextBeat,
    PreviousBeat,
    Personas,
    Input,
    Include,
    DateToday,
    Ifs,
    IsEmpty,
    WordCount,
    FirstWords,
    LastWords,
}

impl Builtin {
    pub const ALL: [Builtin; 17] = [
        Builtin::TextBefore,
        Builtin::TextAfter,
        Builtin::StorySoFar,
        Builtin::StoryToCome,
        Builtin::Message,
        Builtin::Content,
        Builtin::NextBeat,
        Builtin::PreviousBeat,
        Builtin::Personas,
        Builtin::Input,
        Builtin::Include,
        Builtin::DateToday,
        Builtin::Ifs,
        Builtin::IsEmpty,
        Builtin::WordCount,
        Builtin::FirstWords,
        Builtin::LastWords,
    ];

    /// Look up a function by the exact name used in templates.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    /// The name used in templates.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::TextBefore => "textBefore",
            Builtin::TextAfter => "textAfter",
            Builtin::StorySoFar => "storySoFar",
            Builtin::StoryToCome => "storyToCome",
            Builtin::Message => "message",
            Builtin::Content => "content",
            Builtin::NextBeat => "nextBeat",
            Builtin::PreviousBeat => "previousBeat",
            Builtin::Personas => "personas",
            Builtin::Input => "input",
            Builtin::Include => "include",
            Builtin::DateToday => "date.today",
            Builtin::Ifs => "ifs",
            Builtin::IsEmpty => "isEmpty",
            Builtin::WordCount => "wordCount",
            Builtin::FirstWords => "firstWords",
            Builtin::LastWords => "lastWords",
        }
    }

    /// Functions that simply read the context root key of the same name.
    pub fn context_key(self) -> Option<&'static str> {
        match self {
            Builtin::TextBefore
            | Builtin::TextAfter
            | Builtin::StorySoFar
            | Builtin::StoryToCome
            | Builtin::Message
            | Builtin::Content
            | Builtin::NextBeat
            | Builtin::PreviousBeat
            | Builtin::Personas => Some(self.name()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Template truthiness: anything but blank, "false" or "0".
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty() || value == "false" || value == "0")
}

/// Number of whitespace separated words once markup tags are removed.
pub fn word_count(text: &str) -> usize {
    MARKUP_TAG.replace_all(text, " ").split_whitespace().count()
}

/// The first `count` space separated words.
pub fn first_words(text: &str, count: usize) -> String {
    text.split(' ').take(count).collect::<Vec<_>>().join(" ")
}

/// The last `count` space separated words.
pub fn last_words(text: &str, count: usize) -> String {
    let words: Vec<_> = text.split(' ').collect();
    let start = words.len().saturating_sub(count);
    words[start..].join(" ")
}

/// Parse the optional count argument of the word functions.
pub fn parse_count(arg: Option<&str>) -> usize {
    arg.and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_WORD_COUNT)
}
