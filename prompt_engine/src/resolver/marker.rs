//! Variable and function marker syntax.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// `{path}` or `{name(args)}`. Arguments may contain one level of nested
/// parentheses, never braces.
pub(crate) static VARIABLE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\{([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)(?:\(((?:[^(){}]|\([^(){}]*\))*)\))?\}",
    )
    .expect("valid variable marker regex")
});

/// One matched marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Marker<'t> {
    /// The full marker text, braces included.
    pub raw: &'t str,
    /// Dotted identifier path or function name.
    pub path: &'t str,
    /// Raw argument list when call syntax was used.
    pub args: Option<&'t str>,
}

impl<'t> Marker<'t> {
    pub fn from_captures(caps: &Captures<'t>) -> Self {
        Self {
            raw: caps.get(0).map_or("", |m| m.as_str()),
            path: caps.get(1).map_or("", |m| m.as_str()),
            args: caps.get(2).map(|m| m.as_str()),
        }
    }

    pub fn is_call(&self) -> bool {
        self.args.is_some()
    }
}

/// Split a raw argument list on top-level commas.
///
/// Each argument is trimmed, then loses one matching pair of surrounding
/// `"` or `'` quotes. Quoted commas are not protected.
pub(crate) fn split_args(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, c) in raw.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(clean_arg(&raw[start..index]));
                start = index + 1;
            }
            _ => {}
        }
    }
    args.push(clean_arg(&raw[start..]));
    args
}

fn clean_arg(arg: &str) -> String {
    let arg = arg.trim();
    for quote in ['"', '\''] {
        if arg.len() >= 2 && arg.starts_with(quote) && arg.ends_with(quote) {
            return arg[1..arg.len() - 1].to_string();
        }
    }
    arg.to_string()
}
