//! Runtime value types
//!
//! Storage, frame-local state and variables all hold `Val`s so that flows can
//! bind heterogeneous data under string keys.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

/// Runtime value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Val {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    List(Vec<Val>),
    Obj(HashMap<String, Val>),
}

impl Val {
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Val::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Val::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Val::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_obj(&self) -> Option<&HashMap<String, Val>> {
        match self {
            Val::Obj(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_obj_mut(&mut self) -> Option<&mut HashMap<String, Val>> {
        match self {
            Val::Obj(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a field on an object value; `None` for non-objects.
    pub fn field(&self, name: &str) -> Option<&Val> {
        self.as_obj().and_then(|map| map.get(name))
    }
}

/// Text form used when a value is rendered as speech
///
/// Strings render bare and `Null` renders empty; anything else renders as
/// its JSON text.
impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Null => Ok(()),
            Val::Str(s) => f.write_str(s),
            other => write!(f, "{}", val_to_json(other)),
        }
    }
}

impl From<bool> for Val {
    fn from(b: bool) -> Self {
        Val::Bool(b)
    }
}

impl From<f64> for Val {
    fn from(n: f64) -> Self {
        Val::Num(n)
    }
}

impl From<i64> for Val {
    fn from(n: i64) -> Self {
        Val::Num(n as f64)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Self {
        Val::Str(s.to_string())
    }
}

impl From<String> for Val {
    fn from(s: String) -> Self {
        Val::Str(s)
    }
}

impl<T: Into<Val>> From<Vec<T>> for Val {
    fn from(items: Vec<T>) -> Self {
        Val::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<HashMap<String, Val>> for Val {
    fn from(map: HashMap<String, Val>) -> Self {
        Val::Obj(map)
    }
}

/* ===================== JSON Conversion ===================== */

impl From<&JsonValue> for Val {
    fn from(json: &JsonValue) -> Self {
        json_to_val(json)
    }
}

/// Convert a JSON value into a runtime value
///
/// Numbers that do not fit in an f64 lose precision, matching how flows
/// treat every number.
pub fn json_to_val(json: &JsonValue) -> Val {
    match json {
        JsonValue::Null => Val::Null,
        JsonValue::Bool(b) => Val::Bool(*b),
        JsonValue::Number(n) => Val::Num(n.as_f64().unwrap_or(0.0)),
        JsonValue::String(s) => Val::Str(s.clone()),
        JsonValue::Array(items) => Val::List(items.iter().map(json_to_val).collect()),
        JsonValue::Object(map) => Val::Obj(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_val(v)))
                .collect(),
        ),
    }
}

/// Convert a runtime value into plain JSON
///
/// Non-finite numbers have no JSON representation and become `null`.
pub fn val_to_json(val: &Val) -> JsonValue {
    match val {
        Val::Null => JsonValue::Null,
        Val::Bool(b) => JsonValue::Bool(*b),
        Val::Num(n) => serde_json::Number::from_f64(*n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Val::Str(s) => JsonValue::String(s.clone()),
        Val::List(items) => JsonValue::Array(items.iter().map(val_to_json).collect()),
        Val::Obj(map) => JsonValue::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), val_to_json(v)))
                .collect(),
        ),
    }
}
