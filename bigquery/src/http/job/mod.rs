use std::fmt;
use std::str::FromStr;

use crate::http::table::{SourceFormat, TableReference, TableSchema};
use crate::http::types::ErrorProto;

pub mod get;
pub mod get_query_results;
pub mod query;

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteDisposition {
    WriteTruncate,
    #[default]
    WriteAppend,
    /// Fails the job with `duplicate` when the table has rows.
    WriteEmpty,
}

impl FromStr for WriteDisposition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WRITE_TRUNCATE" | "TRUNCATE" => Ok(Self::WriteTruncate),
            "WRITE_APPEND" | "APPEND" => Ok(Self::WriteAppend),
            "WRITE_EMPTY" | "EMPTY" => Ok(Self::WriteEmpty),
            _ => Err(format!("unknown write disposition {s}")),
        }
    }
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationLoad {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_format: Option<SourceFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
    pub destination_table: TableReference,
    /// WRITE_APPEND when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_disposition: Option<WriteDisposition>,
    /// CSV header rows to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_leading_rows: Option<i64>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobConfiguration {
    /// Set by the service in responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load: Option<JobConfigurationLoad>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub job_id: String,
    /// Needed to look the job up again outside the US and EU multi-regions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl fmt::Display for JobReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project_id, self.job_id)
    }
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    /// Present once the job has failed.
    pub error_result: Option<ErrorProto>,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
    #[serde(default)]
    pub state: String,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum JobState {
    Pending,
    Running,
    Done,
    Unknown(String),
}

impl JobStatus {
    pub fn job_state(&self) -> JobState {
        match self.state.as_str() {
            "PENDING" => JobState::Pending,
            "RUNNING" => JobState::Running,
            "DONE" => JobState::Done,
            other => JobState::Unknown(other.to_string()),
        }
    }

    /// The error result together with the listed errors, skipping the duplicate
    /// the service repeats in both places.
    pub fn all_errors(&self) -> Vec<&ErrorProto> {
        let mut errors: Vec<&ErrorProto> = self.error_result.iter().collect();
        for e in &self.errors {
            if !errors.contains(&e) {
                errors.push(e);
            }
        }
        errors
    }
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub self_link: String,
    #[serde(default)]
    pub configuration: JobConfiguration,
    /// Assigned by the service when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<JobReference>,
    /// Never sent; read while polling.
    #[serde(default, skip_serializing)]
    pub status: JobStatus,
}
