//! Database row representation.

use crate::Result;
use crate::error::{Error, TypeError};
use crate::value::Value;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;

/// Column metadata shared across all rows in a result set.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    names: Vec<String>,
    name_to_index: HashMap<String, usize>,
}

impl ColumnInfo {
    /// Create new column info from a list of column names.
    pub fn new(names: Vec<String>) -> Self {
        let name_to_index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names,
            name_to_index,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get the index of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// A single row returned from a database query.
///
/// Column metadata is shared via `Arc` between rows of one result set.
#[derive(Debug, Clone)]
pub struct Row {
    values: Vec<Value>,
    columns: Arc<ColumnInfo>,
}

impl Row {
    /// Create a new row with the given columns and values.
    pub fn new(column_names: Vec<String>, values: Vec<Value>) -> Self {
        let columns = Arc::new(ColumnInfo::new(column_names));
        Self { values, columns }
    }

    /// Create a new row with shared column metadata.
    pub fn with_columns(columns: Arc<ColumnInfo>, values: Vec<Value>) -> Self {
        Self { values, columns }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value by column name.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns.index_of(name).and_then(|i| self.values.get(i))
    }

    /// Get a typed value by column index.
    pub fn get_as<T: FromValue>(&self, index: usize) -> Result<T> {
        let value = self.get(index).ok_or_else(|| {
            Error::Type(TypeError {
                expected: std::any::type_name::<T>(),
                actual: format!(
                    "index {} out of bounds (row has {} columns)",
                    index,
                    self.len()
                ),
                column: None,
            })
        })?;
        T::from_value(value)
    }

    /// Get a typed value by column name.
    pub fn get_named<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get_by_name(name).ok_or_else(|| {
            Error::Type(TypeError {
                expected: std::any::type_name::<T>(),
                actual: format!("column '{}' not found", name),
                column: Some(name.to_string()),
            })
        })?;
        T::from_value(value).map_err(|e| match e {
            Error::Type(mut te) => {
                te.column = Some(name.to_string());
                Error::Type(te)
            }
            e => e,
        })
    }

    /// Get all column names.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.names().iter().map(String::as_str)
    }
}

/// Trait for converting from a `Value` to a typed value.
pub trait FromValue: Sized {
    /// Convert from a Value, returning an error if the conversion fails.
    fn from_value(value: &Value) -> Result<Self>;
}

fn mismatch(expected: &'static str, value: &Value) -> Error {
    Error::Type(TypeError {
        expected,
        actual: value.type_name().to_string(),
        column: None,
    })
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Int(v) => Ok(*v),
            Value::BigInt(v) => i32::try_from(*v).map_err(|_| {
                Error::Type(TypeError {
                    expected: "i32",
                    actual: format!("out of range value {v}"),
                    column: None,
                })
            }),
            _ => Err(mismatch("i32", value)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Int(v) => Ok(i64::from(*v)),
            Value::BigInt(v) => Ok(*v),
            _ => Err(mismatch("i64", value)),
        }
    }
}

impl FromValue for u8 {
    fn from_value(value: &Value) -> Result<Self> {
        let v = value.as_i64().ok_or_else(|| mismatch("u8", value))?;
        u8::try_from(v).map_err(|_| {
            Error::Type(TypeError {
                expected: "u8",
                actual: format!("out of range value {v}"),
                column: None,
            })
        })
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("String", value))
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_date().ok_or_else(|| mismatch("date", value))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor_row() -> Row {
        Row::new(
            vec![
                "id".to_string(),
                "first_name".to_string(),
                "middle_name".to_string(),
                "birthday".to_string(),
            ],
            vec![
                Value::Int(3),
                Value::Text("Keanu".to_string()),
                Value::Null,
                Value::Text("1964-09-02".to_string()),
            ],
        )
    }

    #[test]
    fn test_row_typed_access() {
        let row = actor_row();
        assert_eq!(row.len(), 4);
        assert_eq!(row.get_named::<i64>("id").unwrap(), 3);
        assert_eq!(row.get_as::<String>(1).unwrap(), "Keanu");
        assert_eq!(row.get_named::<Option<String>>("middle_name").unwrap(), None);
        assert_eq!(
            row.get_named::<NaiveDate>("birthday").unwrap(),
            NaiveDate::from_ymd_opt(1964, 9, 2).unwrap()
        );
        assert_eq!(
            row.column_names().collect::<Vec<_>>(),
            vec!["id", "first_name", "middle_name", "birthday"]
        );
    }

    #[test]
    fn test_row_type_errors_name_the_column() {
        let row = actor_row();
        match row.get_named::<i64>("first_name") {
            Err(Error::Type(te)) => {
                assert_eq!(te.column.as_deref(), Some("first_name"));
                assert_eq!(te.expected, "i64");
            }
            other => panic!("expected type error, got {other:?}"),
        }
        assert!(row.get_named::<i64>("missing").is_err());
        assert!(row.get_as::<i64>(10).is_err());
    }

    #[test]
    fn test_small_integer_ranges() {
        assert_eq!(u8::from_value(&Value::Int(10)).unwrap(), 10);
        assert!(u8::from_value(&Value::Int(300)).is_err());
        assert!(i32::from_value(&Value::BigInt(i64::MAX)).is_err());
        assert!(bool::from_value(&Value::Int(1)).unwrap());
    }
}
