//! Component expansion - inlines `[[name]]` snippets.
//!
//! Expansion is textual: each pass replaces every known marker with the
//! component's raw content, then the pass is repeated while markers remain,
//! up to the configured depth. Unknown markers are left verbatim so callers
//! can see what is missing.

mod registry;

pub use registry::*;

use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

static COMPONENT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([A-Za-z_][A-Za-z0-9_]*)\]\]").expect("valid component marker regex")
});

/// Check whether `text` contains any `[[name]]` marker.
pub fn contains_component_marker(text: &str) -> bool {
    COMPONENT_MARKER.is_match(text)
}

/// All component names referenced in `text`, deduplicated, in order of first appearance.
pub fn referenced_names(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    COMPONENT_MARKER
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Names referenced in `text` that the registry cannot resolve.
pub fn missing_names(text: &str, registry: &ComponentRegistry<'_>) -> Vec<String> {
    referenced_names(text)
        .into_iter()
        .filter(|name| !registry.contains(name))
        .collect()
}

/// Expands component markers with a bounded number of passes.
#[derive(Debug, Clone, Copy)]
pub struct ComponentExpander {
    max_depth: u32,
}

impl Default for ComponentExpander {
    fn default() -> Self {
        Self { max_depth: 10 }
    }
}

impl ComponentExpander {
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Expand every resolvable marker in `text`.
    ///
    /// The first pass runs at depth 0; a further pass runs while the output
    /// still holds a marker and the depth is below `max_depth`. Markers left
    /// at the ceiling stay in the output.
    pub fn expand(&self, text: &str, registry: &ComponentRegistry<'_>) -> String {
        let mut current = Self::expand_once(text, registry);
        let mut depth = 0;

        while contains_component_marker(&current) {
            if depth >= self.max_depth {
                tracing::warn!(
                    max_depth = self.max_depth,
                    remaining = ?referenced_names(&current),
                    "component depth ceiling reached"
                );
                break;
            }
            depth += 1;

            let next = Self::expand_once(&current, registry);
            if next == current {
                // Only unresolvable markers are left.
                break;
            }
            tracing::trace!(depth, "expanded nested components");
            current = next;
        }

        current
    }

    /// One left-to-right substitution pass.
    fn expand_once(text: &str, registry: &ComponentRegistry<'_>) -> String {
        COMPONENT_MARKER
            .replace_all(text, |caps: &Captures<'_>| match registry.get(&caps[1]) {
                Some(content) => content.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple() {
        let registry = ComponentRegistry::from_entries([("greeting", "Hello, {scene.title}!")]);
        let expanded = ComponentExpander::default().expand("[[greeting]] Go.", &registry);
        assert_eq!(expanded, "Hello, {scene.title}! Go.");
    }

    #[test]
    fn test_missing_component_left_verbatim() {
        let registry = ComponentRegistry::empty();
        assert_eq!(ComponentExpander::default().expand("[[missing]]", &registry), "[[missing]]");
    }

    #[test]
    fn test_nested_components() {
        let registry = ComponentRegistry::from_entries([
            ("outer", "<[[middle]]>"),
            ("middle", "(([[inner]]))"),
            ("inner", "core"),
        ]);
        let expanded = ComponentExpander::default().expand("[[outer]]", &registry);
        assert_eq!(expanded, "<((core))>");
    }

    #[test]
    fn test_mixed_known_and_unknown() {
        let registry = ComponentRegistry::from_entries([("a", "A")]);
        let expanded = ComponentExpander::default().expand("[[a]] [[b]] [[a]]", &registry);
        assert_eq!(expanded, "A [[b]] A");
    }

    #[test]
    fn test_cycle_terminates() {
        let registry = ComponentRegistry::from_entries([("a", "[[b]]"), ("b", "[[a]]")]);
        let expanded = ComponentExpander::default().expand("[[a]]", &registry);
        // Eleven passes (depth 0 through 10) swap the marker an odd number of times.
        assert_eq!(expanded, "[[b]]");
    }

    #[test]
    fn test_default_depth_ceiling() {
        let registry = ComponentRegistry::from_entries([("a", "x[[a]]")]);
        let expander = ComponentExpander::default();
        assert_eq!(expander.max_depth(), 10);

        let expanded = expander.expand("[[a]]", &registry);
        assert_eq!(expanded, format!("{}[[a]]", "x".repeat(11)));
    }

    #[test]
    fn test_self_growing_component_bounded_by_depth() {
        let registry = ComponentRegistry::from_entries([("a", "x[[a]]")]);
        let expanded = ComponentExpander::new(3).expand("[[a]]", &registry);
        // One pass at depth 0 plus three more.
        assert_eq!(expanded, "xxxx[[a]]");
    }

    #[test]
    fn test_invalid_identifiers_are_plain_text() {
        let registry = ComponentRegistry::from_entries([("a", "A")]);
        let text = "[[1a]] [[a b]] [a] [[ a ]]";
        assert_eq!(ComponentExpander::default().expand(text, &registry), text);
    }

    #[test]
    fn test_referenced_names_deduplicated() {
        let names = referenced_names("[[b]] then [[a]] then [[b]] and [[c_1]]");
        assert_eq!(names, vec!["b", "a", "c_1"]);
    }

    #[test]
    fn test_missing_names() {
        let registry = ComponentRegistry::from_entries([("a", "A")]);
        let missing = missing_names("[[a]] [[b]] [[c]] [[b]]", &registry);
        assert_eq!(missing, vec!["b", "c"]);
    }

    #[test]
    fn test_text_without_markers_unchanged() {
        let registry = ComponentRegistry::from_entries([("a", "A")]);
        let text = "Nothing to see {here}.";
        assert_eq!(ComponentExpander::default().expand(text, &registry), text);
    }
}
