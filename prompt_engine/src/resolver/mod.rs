//! Variable and function resolution - substitutes `{path}` and `{name(args)}`.
//!
//! A marker without call syntax is first looked up as a dotted path in the
//! context. When that walk fails, or when call syntax was used, the full path
//! string is looked up in the built-in function table. Anything still
//! unresolved stays in the output verbatim.

mod builtin;
mod format;
mod marker;

pub use builtin::*;
pub use format::*;

use regex::Captures;
use std::fmt::Write;

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::context::PromptContext;
use marker::{split_args, Marker, VARIABLE_MARKER};

/// A span of resolver output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPiece {
    /// Final text: literal template text or a substituted value.
    Text(String),
    /// A top-level `{include(name)}`, rendered as `[[name]]`.
    Include(String),
}

impl ResolvedPiece {
    pub fn into_text(self) -> String {
        match self {
            ResolvedPiece::Text(text) => text,
            ResolvedPiece::Include(name) => format!("[[{}]]", name),
        }
    }
}

/// Resolves variable and function markers against a [`PromptContext`].
pub struct VariableResolver {
    clock: Box<dyn Clock>,
    date_format: String,
    max_call_depth: u32,
}

impl Default for VariableResolver {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl VariableResolver {
    /// Create a resolver using the system clock.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// Create a resolver with a specific date source.
    pub fn with_clock(config: &EngineConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            date_format: config.date_format.clone(),
            max_call_depth: config.max_call_depth,
        }
    }

    /// Replace every resolvable marker in `text`.
    pub fn resolve(&self, text: &str, ctx: &PromptContext) -> String {
        self.resolve_pieces(text, ctx)
            .into_iter()
            .map(ResolvedPiece::into_text)
            .collect()
    }

    /// Resolve `text`, keeping top-level `include()` results apart from the
    /// substituted text so values taken from the context are never re-expanded.
    pub fn resolve_pieces(&self, text: &str, ctx: &PromptContext) -> Vec<ResolvedPiece> {
        let mut pieces = Vec::new();
        let mut last = 0;

        for caps in VARIABLE_MARKER.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() > last {
                pieces.push(ResolvedPiece::Text(text[last..whole.start()].to_string()));
            }
            last = whole.end();

            let marker = Marker::from_captures(&caps);
            if let Some(name) = Self::include_target(&marker) {
                pieces.push(ResolvedPiece::Include(name));
                continue;
            }

            let value = self.resolve_marker(&marker, ctx, 0).unwrap_or_else(|| {
                tracing::trace!(marker = marker.raw, "leaving unresolved marker");
                marker.raw.to_string()
            });
            pieces.push(ResolvedPiece::Text(value));
        }

        if last < text.len() {
            pieces.push(ResolvedPiece::Text(text[last..].to_string()));
        }
        pieces
    }

    fn include_target(marker: &Marker<'_>) -> Option<String> {
        if Builtin::from_name(marker.path) != Some(Builtin::Include) {
            return None;
        }
        let name = split_args(marker.args?).into_iter().next()?;
        (!name.is_empty()).then_some(name)
    }

    fn resolve_at(&self, text: &str, ctx: &PromptContext, depth: u32) -> String {
        VARIABLE_MARKER
            .replace_all(text, |caps: &Captures<'_>| {
                let marker = Marker::from_captures(caps);
                match self.resolve_marker(&marker, ctx, depth) {
                    Some(value) => value,
                    None => {
                        tracing::trace!(marker = marker.raw, "leaving unresolved marker");
                        marker.raw.to_string()
                    }
                }
            })
            .into_owned()
    }

    fn resolve_marker(&self, marker: &Marker<'_>, ctx: &PromptContext, depth: u32) -> Option<String> {
        if !marker.is_call() {
            if let Some(value) = ctx.lookup(marker.path.split('.')) {
                return Some(render_value(value));
            }
        }

        let builtin = Builtin::from_name(marker.path)?;
        let args = marker.args.map(split_args).unwrap_or_default();
        self.call(builtin, &args, ctx, depth)
    }

    fn call(&self, builtin: Builtin, args: &[String], ctx: &PromptContext, depth: u32) -> Option<String> {
        let arg = |index: usize| args.get(index).map(String::as_str).unwrap_or("");

        let result = match builtin {
            Builtin::Input => ctx
                .lookup(["inputs", arg(0)])
                .map(render_value)
                .unwrap_or_default(),
            Builtin::Include => {
                let name = arg(0);
                if name.is_empty() {
                    return None;
                }
                format!("[[{}]]", name)
            }
            Builtin::DateToday => self.today(),
            Builtin::Ifs => {
                let condition = self.resolve_argument(arg(0), ctx, depth);
                if is_truthy(&condition) {
                    arg(1).to_string()
                } else {
                    arg(2).to_string()
                }
            }
            Builtin::IsEmpty => {
                let value = self.resolve_argument(arg(0), ctx, depth);
                value.trim().is_empty().to_string()
            }
            Builtin::WordCount => {
                let value = self.resolve_argument(arg(0), ctx, depth);
                word_count(&value).to_string()
            }
            Builtin::FirstWords => {
                let value = self.resolve_argument(arg(0), ctx, depth);
                first_words(&value, parse_count(args.get(1).map(String::as_str)))
            }
            Builtin::LastWords => {
                let value = self.resolve_argument(arg(0), ctx, depth);
                last_words(&value, parse_count(args.get(1).map(String::as_str)))
            }
            passthrough => passthrough
                .context_key()
                .and_then(|key| ctx.get(key))
                .map(render_value)
                .unwrap_or_default(),
        };

        Some(result)
    }

    /// Resolve a function argument as if it were written `{name}`.
    ///
    /// Nested argument resolution shares one depth budget per marker; past
    /// `max_call_depth` the synthetic marker is returned unresolved.
    fn resolve_argument(&self, name: &str, ctx: &PromptContext, depth: u32) -> String {
        let synthetic = format!("{{{}}}", name);
        let next = depth + 1;
        if next > self.max_call_depth {
            tracing::warn!(
                max_call_depth = self.max_call_depth,
                argument = name,
                "function call depth ceiling reached"
            );
            return synthetic;
        }
        self.resolve_at(&synthetic, ctx, next)
    }

    fn today(&self) -> String {
        let today = self.clock.today();
        let mut formatted = String::new();
        if write!(formatted, "{}", today.format(&self.date_format)).is_err() {
            tracing::warn!(format = %self.date_format, "invalid date format, using default");
            return today.format("%B %-d, %Y").to_string();
        }
        formatted
    }
}

impl std::fmt::Debug for VariableResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableResolver")
            .field("date_format", &self.date_format)
            .field("max_call_depth", &self.max_call_depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;
    use serde_json::json;

    fn resolver() -> VariableResolver {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        VariableResolver::with_clock(&EngineConfig::default(), Box::new(FixedClock(date)))
    }

    fn ctx(value: serde_json::Value) -> PromptContext {
        PromptContext::from_json(value)
    }

    #[test]
    fn test_path_lookup() {
        let ctx = ctx(json!({"scene": {"title": "Storm"}}));
        assert_eq!(resolver().resolve("{scene.title}", &ctx), "Storm");
    }

    #[test]
    fn test_unknown_path_left_verbatim() {
        let empty = PromptContext::new();
        assert_eq!(resolver().resolve("{unknownPath}", &empty), "{unknownPath}");
        assert_eq!(resolver().resolve("{scene.title}", &empty), "{scene.title}");
        assert_eq!(resolver().resolve("{mystery(a, b)}", &empty), "{mystery(a, b)}");
    }

    #[test]
    fn test_walk_into_scalar_fails() {
        let ctx = ctx(json!({"scene": "flat"}));
        assert_eq!(resolver().resolve("{scene.title}", &ctx), "{scene.title}");
    }

    #[test]
    fn test_context_key_masks_builtin() {
        let ctx = ctx(json!({"date": {"today": "the day of the storm"}}));
        assert_eq!(resolver().resolve("{date.today}", &ctx), "the day of the storm");
    }

    #[test]
    fn test_builtin_used_when_walk_fails() {
        let ctx = ctx(json!({"date": {"year": 1900}}));
        assert_eq!(resolver().resolve("{date.today}", &ctx), "March 9, 2024");
        assert_eq!(resolver().resolve("{date.today}", &PromptContext::new()), "March 9, 2024");
    }

    #[test]
    fn test_passthrough_builtins() {
        let ctx = ctx(json!({"textBefore": "It was dark.", "personas": [{"name": "Editor"}]}));
        let r = resolver();
        assert_eq!(r.resolve("{textBefore}", &ctx), "It was dark.");
        assert_eq!(r.resolve("{textBefore()}", &ctx), "It was dark.");
        assert_eq!(r.resolve("{personas}", &ctx), "Editor");
        assert_eq!(r.resolve("[{textAfter}]", &ctx), "[]");
        assert_eq!(r.resolve("[{nextBeat()}]", &ctx), "[]");
    }

    #[test]
    fn test_input() {
        let ctx = ctx(json!({"inputs": {"mood": "grim"}}));
        let r = resolver();
        assert_eq!(r.resolve("{input(mood)}", &ctx), "grim");
        assert_eq!(r.resolve("{input('mood')}", &ctx), "grim");
        assert_eq!(r.resolve("[{input(pace)}]", &ctx), "[]");
        assert_eq!(r.resolve("[{input(mood)}]", &PromptContext::new()), "[]");
    }

    #[test]
    fn test_include_reinjects_component_syntax() {
        let r = resolver();
        assert_eq!(r.resolve("{include(greeting)}", &PromptContext::new()), "[[greeting]]");
        assert_eq!(r.resolve("{include()}", &PromptContext::new()), "{include()}");
    }

    #[test]
    fn test_include_reported_as_piece() {
        let ctx = ctx(json!({"message": "see [[notes]]"}));
        let pieces = resolver().resolve_pieces("A {include('intro')} {message}", &ctx);
        assert_eq!(
            pieces,
            vec![
                ResolvedPiece::Text("A ".to_string()),
                ResolvedPiece::Include("intro".to_string()),
                ResolvedPiece::Text(" ".to_string()),
                ResolvedPiece::Text("see [[notes]]".to_string()),
            ]
        );
    }

    #[test]
    fn test_word_count() {
        let ctx = ctx(json!({"content": "one two three"}));
        assert_eq!(resolver().resolve("{wordCount(content)}", &ctx), "3");
    }

    #[test]
    fn test_ifs() {
        let r = resolver();
        let empty = ctx(json!({"message": ""}));
        let full = ctx(json!({"message": "hi"}));
        assert_eq!(r.resolve("{ifs(message, Yes, No)}", &empty), "No");
        assert_eq!(r.resolve("{ifs(message, Yes, No)}", &full), "Yes");
        assert_eq!(r.resolve("{ifs(message, Yes, No)}", &PromptContext::new()), "No");
    }

    #[test]
    fn test_ifs_falsy_literals() {
        let r = resolver();
        assert_eq!(r.resolve("{ifs(flag, on, off)}", &ctx(json!({"flag": false}))), "off");
        assert_eq!(r.resolve("{ifs(flag, on, off)}", &ctx(json!({"flag": 0}))), "off");
        assert_eq!(r.resolve("{ifs(flag, on, off)}", &ctx(json!({"flag": 1}))), "on");
    }

    #[test]
    fn test_ifs_branches_are_not_resolved() {
        let ctx = ctx(json!({"message": "hi", "scene": {"title": "Storm"}}));
        assert_eq!(
            resolver().resolve("{ifs(message, \"use scene.title\", no)}", &ctx),
            "use scene.title"
        );
    }

    #[test]
    fn test_is_empty() {
        let r = resolver();
        assert_eq!(r.resolve("{isEmpty(content)}", &ctx(json!({"content": "  "}))), "true");
        assert_eq!(r.resolve("{isEmpty(content)}", &ctx(json!({"content": "x"}))), "false");
        assert_eq!(r.resolve("{isEmpty(content)}", &PromptContext::new()), "true");
    }

    #[test]
    fn test_first_and_last_words() {
        let ctx = ctx(json!({"storySoFar": "a b c d e"}));
        let r = resolver();
        assert_eq!(r.resolve("{firstWords(storySoFar, 2)}", &ctx), "a b");
        assert_eq!(r.resolve("{lastWords(storySoFar, 2)}", &ctx), "d e");
        assert_eq!(r.resolve("{lastWords(storySoFar, 50)}", &ctx), "a b c d e");
        assert_eq!(r.resolve("{firstWords(storySoFar)}", &ctx), "a b c d e");
    }

    #[test]
    fn test_word_functions_on_paths() {
        let ctx = ctx(json!({"scene": {"fullText": "The rain fell hard"}}));
        assert_eq!(resolver().resolve("{lastWords(scene.fullText, 1)}", &ctx), "hard");
    }

    #[test]
    fn test_nested_function_argument() {
        let r = resolver();
        let template = "{ifs(isEmpty(content), empty, full)}";
        assert_eq!(r.resolve(template, &ctx(json!({"content": ""}))), "empty");
        assert_eq!(r.resolve(template, &ctx(json!({"content": "x"}))), "full");
    }

    #[test]
    fn test_call_depth_ceiling() {
        let config = EngineConfig {
            max_call_depth: 1,
            ..EngineConfig::default()
        };
        let r = VariableResolver::new(&config);
        let ctx = ctx(json!({"content": ""}));

        // isEmpty(content) would need a second level, so it sees "{content}" unresolved.
        assert_eq!(r.resolve("{ifs(isEmpty(content), empty, full)}", &ctx), "full");
    }

    #[test]
    fn test_codex_rendering() {
        let ctx = ctx(json!({"codex": {"characters": [{"name": "Mara", "description": "A smuggler."}]}}));
        assert_eq!(resolver().resolve("{codex}", &ctx), "**Mara**: A smuggler.");
    }

    #[test]
    fn test_idempotent_on_resolved_text() {
        let ctx = ctx(json!({"scene": {"title": "Storm"}}));
        let r = resolver();
        let once = r.resolve("Title: {scene.title}.", &ctx);
        assert_eq!(r.resolve(&once, &ctx), once);
    }

    #[test]
    fn test_malformed_markers_are_text() {
        let ctx = ctx(json!({"message": "hi"}));
        let text = "{ifs(message, a} {message";
        assert_eq!(resolver().resolve(text, &ctx), text);
    }

    #[test]
    fn test_custom_date_format() {
        let config = EngineConfig {
            date_format: "%Y-%m-%d".to_string(),
            ..EngineConfig::default()
        };
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let r = VariableResolver::with_clock(&config, Box::new(FixedClock(date)));
        assert_eq!(r.resolve("{date.today}", &PromptContext::new()), "2024-03-09");
    }
}
