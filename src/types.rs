//! Value and result types shared by the helper and its executors

use chrono::NaiveDateTime;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Scalar column or parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Binary(Vec<u8>),
    DateTime(NaiveDateTime),
    /// MySQL TIME, rendered as `[-]HHH:MM:SS[.ffffff]`
    Time(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view of the value.
    ///
    /// Textual and binary values are accepted when they parse as an integer,
    /// since the MySQL text protocol returns every column as bytes.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            Value::Bool(b) => Some(*b as i64),
            Value::String(s) => s.trim().parse().ok(),
            Value::Binary(b) => std::str::from_utf8(b).ok()?.trim().parse().ok(),
            _ => None,
        }
    }

    /// Short type tag used in log summaries
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOL",
            Value::Int(_) | Value::UInt(_) => "INT",
            Value::Float(_) => "FLOAT",
            Value::String(s) => {
                if s.len() > 50 {
                    "STRING(large)"
                } else {
                    "STRING"
                }
            }
            Value::Binary(b) => {
                if b.len() > 1024 {
                    "BINARY(large)"
                } else {
                    "BINARY"
                }
            }
            Value::DateTime(_) => "DATETIME",
            Value::Time(_) => "TIME",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v as u64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            // Nested structures are bound as their JSON text
            other => Value::String(other.to_string()),
        }
    }
}

/// One result row: column name to value, in driver column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    columns: Vec<(String, Value)>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
        }
    }

    /// Append a column. Returns `false` if the name is already present.
    pub fn push(&mut self, name: impl Into<String>, value: Value) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.columns.push((name, value));
        true
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// First column of the row
    pub fn first(&self) -> Option<(&str, &Value)> {
        self.columns
            .first()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Result of the generic `query` operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOutcome {
    /// `SELECT COUNT(...)` statements
    Count(i64),
    /// Other `SELECT` statements
    Rows(Vec<ResultRow>),
    /// `INSERT`, `UPDATE` and `DELETE` statements
    Affected(u64),
}

impl QueryOutcome {
    pub fn as_count(&self) -> Option<i64> {
        match self {
            QueryOutcome::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_rows(&self) -> Option<&[ResultRow]> {
        match self {
            QueryOutcome::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn as_affected(&self) -> Option<u64> {
        match self {
            QueryOutcome::Affected(n) => Some(*n),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_row_preserves_column_order() {
        let mut row = ResultRow::new();
        assert!(row.push("zeta", Value::Int(1)));
        assert!(row.push("alpha", Value::from("a")));
        assert!(row.push("mid", Value::Null));

        let names: Vec<&str> = row.column_names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(row.first(), Some(("zeta", &Value::Int(1))));

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":"a","mid":null}"#);
    }

    #[test]
    fn test_result_row_rejects_duplicate_column() {
        let mut row = ResultRow::new();
        assert!(row.push("id", Value::Int(1)));
        assert!(!row.push("id", Value::Int(2)));
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("id"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_value_as_i64() {
        assert_eq!(Value::Int(3).as_i64(), Some(3));
        assert_eq!(Value::UInt(7).as_i64(), Some(7));
        assert_eq!(Value::UInt(u64::MAX).as_i64(), None);
        assert_eq!(Value::from(" 42 ").as_i64(), Some(42));
        assert_eq!(Value::Binary(b"12".to_vec()).as_i64(), Some(12));
        assert_eq!(Value::from("abc").as_i64(), None);
        assert_eq!(Value::Float(1.5).as_i64(), None);
        assert_eq!(Value::Null.as_i64(), None);
    }

    #[test]
    fn test_value_from_json() {
        assert_eq!(Value::from(serde_json::json!(1)), Value::Int(1));
        assert_eq!(Value::from(serde_json::json!(1.5)), Value::Float(1.5));
        assert_eq!(Value::from(serde_json::json!("a")), Value::from("a"));
        assert_eq!(Value::from(serde_json::json!(null)), Value::Null);
        assert_eq!(
            Value::from(serde_json::json!([1, 2])),
            Value::String("[1,2]".to_string())
        );
    }

    #[test]
    fn test_query_outcome_serialization() {
        let json = serde_json::to_string(&QueryOutcome::Count(3)).unwrap();
        assert_eq!(json, r#"{"count":3}"#);

        let json = serde_json::to_string(&QueryOutcome::Affected(1)).unwrap();
        assert_eq!(json, r#"{"affected":1}"#);
    }
}
