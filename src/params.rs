//! Named parameter sets
//!
//! A [`Params`] maps parameter names to values. Names are written without the
//! `@` prefix; the SQL text refers to them as `@name`. Names compare
//! case-insensitively, so `@ID` finds a parameter named `id`.

use crate::error::{Error, Result};
use crate::types::Value;
use serde::Serialize;
use std::collections::HashMap;

/// Unordered set of named parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: HashMap<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a parameter set from the fields of a serializable record.
    ///
    /// Each top-level field becomes one parameter. `None`/unit maps to an
    /// empty set; anything other than a struct or map is rejected.
    pub fn from_serialize<T: Serialize + ?Sized>(data: &T) -> Result<Self> {
        let value =
            serde_json::to_value(data).map_err(|e| Error::InvalidParams(e.to_string()))?;
        match value {
            serde_json::Value::Object(fields) => Ok(fields.into_iter().collect()),
            serde_json::Value::Null => Ok(Self::new()),
            other => Err(Error::InvalidParams(format!(
                "parameter data must be a record with named fields, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a parameter, replacing any existing one whose name differs
    /// only in case
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let name = name.strip_prefix('@').map(str::to_string).unwrap_or(name);
        let existing = self.key_of(&name).map(str::to_string);
        let previous = existing.and_then(|key| self.values.remove(&key));
        self.values.insert(name, value.into());
        previous
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.key_of(name).and_then(|key| self.values.get(key))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.key_of(name).is_some()
    }

    /// Stored key matching `name`, exact match first
    fn key_of(&self, name: &str) -> Option<&str> {
        match self.values.get_key_value(name) {
            Some((key, _)) => Some(key.as_str()),
            None => self
                .values
                .keys()
                .find(|key| key.eq_ignore_ascii_case(name))
                .map(String::as_str),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Log-safe summary: names and types, never values
    pub fn summary(&self) -> String {
        let mut entries: Vec<String> = self
            .values
            .iter()
            .map(|(name, value)| format!("@{}: {}", name, value.type_name()))
            .collect();
        entries.sort();
        entries.join(", ")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Build a [`Params`] from `name => value` pairs.
///
/// ```
/// use mysql_query_helper::params;
///
/// let p = params! { "id" => 1, "name" => "a" };
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $(params.insert($name, $value);)+
        params
    }};
}
