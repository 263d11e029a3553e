//! Decoding of query result rows into flat records.
//!
//! Nested RECORD columns are flattened: every leaf is keyed by its dotted path
//! (`attrs.color`), so a record is a plain map from column name to scalar.

use std::collections::BTreeMap;
use std::fmt;

use crate::http::table::{TableFieldSchema, TableFieldType};
use crate::http::types::{Cell, Tuple, Value};

/// A decoded cell. `Float` is always finite.
#[derive(Clone, PartialEq, Debug)]
pub enum Scalar {
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl serde::Serialize for Scalar {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_none(),
            Scalar::String(v) => serializer.serialize_str(v),
            Scalar::Integer(v) => serializer.serialize_i64(*v),
            // serde_json would silently turn these into null
            Scalar::Float(v) if !v.is_finite() => {
                Err(serde::ser::Error::custom(format!("unsupported float value {v}")))
            }
            Scalar::Float(v) => serializer.serialize_f64(*v),
            Scalar::Boolean(v) => serializer.serialize_bool(*v),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => Ok(()),
            Scalar::String(v) => f.write_str(v),
            Scalar::Integer(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Boolean(v) => write!(f, "{v}"),
        }
    }
}

/// One output row keyed by flattened column name, in lexicographic order.
pub type Record = BTreeMap<String, Scalar>;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum DecodeError {
    #[error("invalid {field} value ({value}) - {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },
    #[error("unsupported field type {data_type} on {field}")]
    UnsupportedType { field: String, data_type: TableFieldType },
    #[error("unsupported value on {field}: repeated fields are not supported")]
    UnsupportedValue { field: String },
    #[error("row has {actual} cells, schema has {expected} fields at {path}")]
    CellCount { path: String, expected: usize, actual: usize },
}

/// A flattened leaf column.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FieldType {
    pub name: String,
    pub data_type: TableFieldType,
}

/// Flattens the schema into its leaf columns, in schema order.
pub fn flatten(fields: &[TableFieldSchema]) -> Vec<FieldType> {
    let mut out = Vec::new();
    walk_fields("", fields, &mut out);
    out
}

fn walk_fields(prefix: &str, fields: &[TableFieldSchema], out: &mut Vec<FieldType>) {
    for field in fields {
        let name = qualified(prefix, &field.name);
        if field.data_type.is_record() {
            walk_fields(&name, field.fields.as_deref().unwrap_or_default(), out);
        } else {
            out.push(FieldType {
                name,
                data_type: field.data_type,
            });
        }
    }
}

fn qualified(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Decodes rows against the schema they were returned with.
#[derive(Clone, Debug)]
pub struct RowDecoder {
    fields: Vec<TableFieldSchema>,
    columns: Vec<FieldType>,
}

impl RowDecoder {
    pub fn new(fields: Vec<TableFieldSchema>) -> Self {
        let columns = flatten(&fields);
        Self { fields, columns }
    }

    /// Leaf column names sorted the way records order their keys.
    pub fn sorted_column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.columns.iter().map(|c| c.name.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn decode(&self, row: &Tuple) -> Result<Record, DecodeError> {
        let mut record = Record::new();
        decode_tuple("", &self.fields, &row.f, &mut record)?;
        Ok(record)
    }

    pub fn decode_all(&self, rows: &[Tuple]) -> Result<Vec<Record>, DecodeError> {
        rows.iter().map(|row| self.decode(row)).collect()
    }
}

fn decode_tuple(
    prefix: &str,
    fields: &[TableFieldSchema],
    cells: &[Cell],
    record: &mut Record,
) -> Result<(), DecodeError> {
    if cells.len() != fields.len() {
        return Err(DecodeError::CellCount {
            path: if prefix.is_empty() { "<row>".to_string() } else { prefix.to_string() },
            expected: fields.len(),
            actual: cells.len(),
        });
    }
    for (field, cell) in fields.iter().zip(cells) {
        let name = qualified(prefix, &field.name);
        match &cell.v {
            Value::Null => insert_nulls(&name, field, record),
            Value::Array(_) => return Err(DecodeError::UnsupportedValue { field: name }),
            Value::Struct(tuple) if field.data_type.is_record() => {
                decode_tuple(&name, field.fields.as_deref().unwrap_or_default(), &tuple.f, record)?
            }
            Value::Struct(_) => {
                return Err(DecodeError::InvalidValue {
                    field: name,
                    value: "{...}".to_string(),
                    message: format!("nested value for {} field", field.data_type),
                })
            }
            Value::String(_) if field.data_type.is_record() => {
                return Err(DecodeError::InvalidValue {
                    field: name,
                    value: cell_text(&cell.v),
                    message: "scalar value for RECORD field".to_string(),
                })
            }
            Value::String(raw) => {
                let value = decode_scalar(&name, field.data_type, raw)?;
                record.insert(name, value);
            }
        }
    }
    Ok(())
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

fn insert_nulls(name: &str, field: &TableFieldSchema, record: &mut Record) {
    if field.data_type.is_record() {
        for child in field.fields.as_deref().unwrap_or_default() {
            insert_nulls(&qualified(name, &child.name), child, record);
        }
    } else {
        record.insert(name.to_string(), Scalar::Null);
    }
}

fn decode_scalar(field: &str, data_type: TableFieldType, raw: &str) -> Result<Scalar, DecodeError> {
    let invalid = |message: String| DecodeError::InvalidValue {
        field: field.to_string(),
        value: raw.to_string(),
        message,
    };
    match data_type {
        TableFieldType::String => Ok(Scalar::String(raw.to_string())),
        // TIMESTAMP cells must be integral epoch values.
        TableFieldType::Integer | TableFieldType::Int64 | TableFieldType::Timestamp => raw
            .parse::<i64>()
            .map(Scalar::Integer)
            .map_err(|e| invalid(e.to_string())),
        // NaN, infinities and out of range values have no JSON form
        TableFieldType::Float | TableFieldType::Float64 => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Scalar::Float(v)),
            Ok(_) => Err(invalid("value is not a finite number".to_string())),
            Err(e) => Err(invalid(e.to_string())),
        },
        TableFieldType::Boolean | TableFieldType::Bool => parse_bool(raw)
            .map(Scalar::Boolean)
            .ok_or_else(|| invalid("invalid syntax".to_string())),
        other => Err(DecodeError::UnsupportedType {
            field: field.to_string(),
            data_type: other,
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
