//! Context values - the closed set of shapes a template variable can hold.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keyed context data. Keys are kept sorted so rendering is deterministic.
pub type ContextMap = BTreeMap<String, ContextValue>;

/// A value stored in the prompt context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum ContextValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<ContextValue>),
    Map(ContextMap),
}

impl ContextValue {
    /// Build a map value from key/value pairs.
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ContextValue>,
    {
        ContextValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Look up a key, if this value is a map.
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        match self {
            ContextValue::Map(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ContextMap> {
        match self {
            ContextValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContextValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to JSON for structural rendering.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self)
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Text(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Text(value)
    }
}

impl From<&String> for ContextValue {
    fn from(value: &String) -> Self {
        ContextValue::Text(value.clone())
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Integer(value)
    }
}

impl From<usize> for ContextValue {
    fn from(value: usize) -> Self {
        ContextValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        ContextValue::Float(value)
    }
}

impl<T: Into<ContextValue>> From<Vec<T>> for ContextValue {
    fn from(values: Vec<T>) -> Self {
        ContextValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<ContextMap> for ContextValue {
    fn from(map: ContextMap) -> Self {
        ContextValue::Map(map)
    }
}

impl From<serde_json::Value> for ContextValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ContextValue::Null,
            serde_json::Value::Bool(b) => ContextValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ContextValue::Integer(i),
                None => ContextValue::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => ContextValue::Text(s),
            serde_json::Value::Array(items) => {
                ContextValue::List(items.into_iter().map(ContextValue::from).collect())
            }
            serde_json::Value::Object(fields) => ContextValue::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, ContextValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&ContextValue> for serde_json::Value {
    fn from(value: &ContextValue) -> Self {
        match value {
            ContextValue::Null => serde_json::Value::Null,
            ContextValue::Bool(b) => serde_json::Value::Bool(*b),
            ContextValue::Integer(i) => serde_json::Value::from(*i),
            ContextValue::Float(f) => serde_json::Value::from(*f),
            ContextValue::Text(s) => serde_json::Value::String(s.clone()),
            ContextValue::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            ContextValue::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}
