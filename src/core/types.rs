use super::{DbError, Result, Value};
use serde::{Deserialize, Serialize};

/// Positional row as stored on disk, one value per schema column.
pub type Row = Vec<Value>;

/// Row presented to callers: column name -> value, in schema order.
pub type Record = serde_json::Map<String, Value>;

/// Ordered column names of a table. Serialized as a bare JSON array so it can
/// be written directly as the schema line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_column_index(name).is_some()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Zips a positional row with the column names.
    pub fn to_record(&self, row: Row) -> Record {
        self.columns.iter().cloned().zip(row).collect()
    }

    /// Flattens a record back to schema order. Columns the record does not
    /// carry are filled with an empty string.
    pub fn to_row(&self, record: &Record) -> Row {
        self.columns
            .iter()
            .map(|name| {
                record
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| Value::String(String::new()))
            })
            .collect()
    }
}

/// Cap on how many rows an operation matches or mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    #[default]
    Unbounded,
    AtMost(usize),
}

impl Limit {
    /// True once `count` rows have been produced and no more are allowed.
    pub fn is_reached(&self, count: usize) -> bool {
        match self {
            Self::Unbounded => false,
            Self::AtMost(max) => count >= *max,
        }
    }
}

impl From<i64> for Limit {
    fn from(value: i64) -> Self {
        usize::try_from(value).map_or(Self::Unbounded, Self::AtMost)
    }
}

impl From<i32> for Limit {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl From<usize> for Limit {
    fn from(value: usize) -> Self {
        Self::AtMost(value)
    }
}

impl From<Option<usize>> for Limit {
    fn from(value: Option<usize>) -> Self {
        value.map_or(Self::Unbounded, Self::AtMost)
    }
}

/// Accepts a JSON payload as a row mapping. Anything other than an object is
/// rejected.
pub fn record_from_value(value: Value) -> Result<Record> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DbError::InvalidRow(format!(
            "row payload must be a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_schema_order() {
        let schema = Schema::new(["no", "username", "password"]);
        let record = schema.to_record(vec![json!(1), json!("admin"), json!("1234")]);
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, ["no", "username", "password"]);
    }

    #[test]
    fn test_to_row_defaults_missing_columns() {
        let schema = Schema::new(["no", "username", "password"]);
        let record = record_from_value(json!({"username": "root", "no": 2})).unwrap();
        assert_eq!(schema.to_row(&record), vec![json!(2), json!("root"), json!("")]);
    }

    #[test]
    fn test_limit_from_signed() {
        assert_eq!(Limit::from(-1i64), Limit::Unbounded);
        assert_eq!(Limit::from(0i64), Limit::AtMost(0));
        assert_eq!(Limit::from(3i32), Limit::AtMost(3));
        assert!(Limit::AtMost(2).is_reached(2));
        assert!(!Limit::Unbounded.is_reached(usize::MAX));
    }

    #[test]
    fn test_record_from_value_rejects_non_objects() {
        let err = record_from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, DbError::InvalidRow(_)));
    }

    #[test]
    fn test_schema_serializes_as_array() {
        let schema = Schema::new(["a", "b"]);
        assert_eq!(serde_json::to_string(&schema).unwrap(), r#"["a","b"]"#);
        let parsed: Schema = serde_json::from_str("[]").unwrap();
        assert_eq!(parsed.column_count(), 0);
    }
}
