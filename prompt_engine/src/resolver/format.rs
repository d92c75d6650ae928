//! Rendering of context values into prompt text.

use crate::context::{ContextMap, ContextValue};

/// Map keys rendered as `**name**: description` lists, in output order.
pub const CODEX_GROUPS: [&str; 5] = ["characters", "locations", "items", "lore", "other"];

/// Render a resolved value.
///
/// - Scalars are stringified; `Null` renders as nothing.
/// - Lists render one line per element: a map element shows its `name`, else
///   its `title`, else its compact JSON.
/// - Maps holding codex group lists render one `**name**: description` line
///   per entry. Other non-empty maps render as pretty JSON.
pub fn render_value(value: &ContextValue) -> String {
    match value {
        ContextValue::Null => String::new(),
        ContextValue::Bool(b) => b.to_string(),
        ContextValue::Integer(i) => i.to_string(),
        ContextValue::Float(f) => render_float(*f),
        ContextValue::Text(s) => s.clone(),
        ContextValue::List(items) => items
            .iter()
            .map(render_list_item)
            .collect::<Vec<_>>()
            .join("\n"),
        ContextValue::Map(map) => render_map(map),
    }
}

fn render_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

fn render_list_item(item: &ContextValue) -> String {
    match item {
        ContextValue::Map(map) => map
            .get("name")
            .or_else(|| map.get("title"))
            .map(render_value)
            .unwrap_or_else(|| describe(item)),
        other => render_value(other),
    }
}

fn render_map(map: &ContextMap) -> String {
    if map.is_empty() {
        return String::new();
    }

    let groups: Vec<&Vec<ContextValue>> = CODEX_GROUPS
        .iter()
        .filter_map(|key| match map.get(*key) {
            Some(ContextValue::List(items)) => Some(items),
            _ => None,
        })
        .collect();

    if groups.is_empty() {
        return serde_json::to_string_pretty(&serde_json::Value::from(&ContextValue::Map(map.clone())))
            .unwrap_or_default();
    }

    groups
        .into_iter()
        .flatten()
        .map(render_codex_entry)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_codex_entry(entry: &ContextValue) -> String {
    match entry {
        ContextValue::Map(fields) => {
            let name = fields
                .get("name")
                .or_else(|| fields.get("title"))
                .map(render_value)
                .unwrap_or_default();
            let description = fields.get("description").map(render_value).unwrap_or_default();
            format!("**{}**: {}", name, description)
        }
        other => render_value(other),
    }
}

/// Compact structural description for values with no better rendering.
fn describe(value: &ContextValue) -> String {
    serde_json::to_string(&value.to_json()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: serde_json::Value) -> String {
        render_value(&ContextValue::from(value))
    }

    #[test]
    fn test_scalars() {
        assert_eq!(render(json!("Storm")), "Storm");
        assert_eq!(render(json!(3)), "3");
        assert_eq!(render(json!(3.0)), "3");
        assert_eq!(render(json!(2.5)), "2.5");
        assert_eq!(render(json!(true)), "true");
        assert_eq!(render(json!(null)), "");
    }

    #[test]
    fn test_list_of_maps_prefers_name_then_title() {
        let rendered = render(json!([
            {"name": "Mara", "title": "Captain"},
            {"title": "The Drowned Bell"},
            {"id": 7}
        ]));
        assert_eq!(rendered, "Mara\nThe Drowned Bell\n{\"id\":7}");
    }

    #[test]
    fn test_list_of_scalars() {
        assert_eq!(render(json!(["tense", "night"])), "tense\nnight");
    }

    #[test]
    fn test_codex_groups() {
        let rendered = render(json!({
            "locations": [{"name": "Saltmarsh", "description": "A drowned town."}],
            "characters": [
                {"name": "Mara", "description": "A smuggler."},
                {"name": "Ilse"}
            ]
        }));
        assert_eq!(
            rendered,
            "**Mara**: A smuggler.\n**Ilse**: \n**Saltmarsh**: A drowned town."
        );
    }

    #[test]
    fn test_generic_map_renders_as_json() {
        let rendered = render(json!({"mood": "grim", "pace": 2}));
        assert_eq!(rendered, "{\n  \"mood\": \"grim\",\n  \"pace\": 2\n}");
    }

    #[test]
    fn test_empty_map_renders_nothing() {
        assert_eq!(render(json!({})), "");
    }
}
