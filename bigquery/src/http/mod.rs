use std::fmt::Display;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

pub mod bigquery_client;
pub mod bigquery_dataset_client;
pub mod bigquery_job_client;
pub mod bigquery_upload_client;
pub mod dataset;
pub mod error;
pub mod job;
pub mod table;
pub mod types;

/// Int64 values travel as JSON strings; accepts either a string or a number.
fn from_str_option<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: FromStr,
    T::Err: Display,
    D: Deserializer<'de>,
{
    let s: Option<Value> = Deserialize::deserialize(deserializer)?;
    match s {
        Some(Value::String(s)) => T::from_str(&s).map_err(de::Error::custom).map(Some),
        Some(Value::Number(num)) => T::from_str(&num.to_string()).map_err(de::Error::custom).map(Some),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(de::Error::custom("Incorrect type")),
    }
}

#[cfg(test)]
mod tests {
    #[derive(serde::Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "super::from_str_option")]
        value: Option<i64>,
    }

    #[test]
    fn test_from_str_option() {
        let h: Holder = serde_json::from_str(r#"{"value":"42"}"#).unwrap();
        assert_eq!(h.value, Some(42));
        let h: Holder = serde_json::from_str(r#"{"value":42}"#).unwrap();
        assert_eq!(h.value, Some(42));
        let h: Holder = serde_json::from_str(r#"{"value":null}"#).unwrap();
        assert_eq!(h.value, None);
        let h: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(h.value, None);
        assert!(serde_json::from_str::<Holder>(r#"{"value":"x"}"#).is_err());
    }
}
