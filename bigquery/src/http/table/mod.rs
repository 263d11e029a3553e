use std::fmt;

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    pub project_id: String,
    pub dataset_id: String,
    /// May carry a partition decorator, e.g. `events$20240101`.
    pub table_id: String,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableFieldMode {
    #[default]
    Nullable,
    Required,
    Repeated,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableFieldType {
    #[default]
    String,
    Bytes,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Record,
    Date,
    Time,
    Datetime,
    Numeric,
    Bignumeric,
    Geography,
    Interval,
    Json,
    Range,
    // aliases
    Bool,
    Int64,
    Float64,
    Struct,
}

impl fmt::Display for TableFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the serde name is the wire name
        match serde_json::to_value(self) {
            Ok(serde_json::Value::String(s)) => f.write_str(&s),
            _ => write!(f, "{self:?}"),
        }
    }
}

impl TableFieldType {
    /// RECORD and its STRUCT alias carry nested fields.
    pub fn is_record(&self) -> bool {
        matches!(self, TableFieldType::Record | TableFieldType::Struct)
    }
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableFieldSchema {
    pub name: String,
    /// Serialized as `type`. RECORD and STRUCT carry `fields`.
    #[serde(rename = "type")]
    pub data_type: TableFieldType,
    /// NULLABLE when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<TableFieldMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<TableFieldSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    #[serde(default)]
    pub fields: Vec<TableFieldSchema>,
}

#[derive(Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceFormat {
    #[default]
    Csv,
    NewlineDelimitedJson,
}

impl SourceFormat {
    /// Picks the format from the source file extension: `.json` or `.csv`.
    pub fn from_path(path: &str) -> Option<Self> {
        if path.ends_with(".json") {
            Some(SourceFormat::NewlineDelimitedJson)
        } else if path.ends_with(".csv") {
            Some(SourceFormat::Csv)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_file_layout() {
        let fields: Vec<TableFieldSchema> = serde_json::from_str(
            r#"[
                {"name": "id", "type": "INTEGER", "mode": "REQUIRED"},
                {"name": "attrs", "type": "RECORD", "fields": [
                    {"name": "color", "type": "STRING"}
                ]}
            ]"#,
        )
        .unwrap();
        assert_eq!(fields[0].data_type, TableFieldType::Integer);
        assert_eq!(fields[0].mode, Some(TableFieldMode::Required));
        assert!(fields[1].data_type.is_record());
        assert_eq!(fields[1].fields.as_ref().unwrap()[0].name, "color");

        let back = serde_json::to_value(&fields[1]).unwrap();
        assert_eq!(
            back,
            serde_json::json!({"name": "attrs", "type": "RECORD", "fields": [{"name": "color", "type": "STRING"}]})
        );
    }

    #[test]
    fn test_field_type_display() {
        assert_eq!(TableFieldType::Bignumeric.to_string(), "BIGNUMERIC");
        assert_eq!(TableFieldType::Float64.to_string(), "FLOAT64");
    }

    #[test]
    fn test_source_format_from_path() {
        assert_eq!(SourceFormat::from_path("a/b.json"), Some(SourceFormat::NewlineDelimitedJson));
        assert_eq!(SourceFormat::from_path("b.csv"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::from_path("b.parquet"), None);
        assert_eq!(
            serde_json::to_string(&SourceFormat::NewlineDelimitedJson).unwrap(),
            "\"NEWLINE_DELIMITED_JSON\""
        );
    }
}
