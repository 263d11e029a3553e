use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::job::JobReference;
use crate::http::table::TableSchema;
use crate::http::types::{ErrorProto, Tuple};

/// Body of `jobs.query`. Unset options are omitted so the service defaults apply,
/// including the SQL dialect.
#[derive(Clone, PartialEq, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub kind: String,
    pub query: String,
    /// How long the call may block waiting for the job. The service uses 10s when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_query_cache: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_legacy_sql: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A page of query results. `jobs.query` and `jobs.getQueryResults` share this shape.
///
/// While `job_complete` is false only `job_reference` is meaningful.
#[derive(Clone, PartialEq, serde::Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub schema: Option<TableSchema>,
    #[serde(default)]
    pub job_reference: JobReference,
    /// Rows in the whole result set, not just this page.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    pub total_rows: Option<i64>,
    pub page_token: Option<String>,
    #[serde(default)]
    pub rows: Vec<Tuple>,
    #[serde(default)]
    pub job_complete: bool,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
    #[serde(default)]
    pub cache_hit: bool,
}

pub fn build(base_url: &str, client: &Client, project_id: &str, data: &QueryRequest) -> RequestBuilder {
    client.post(format!("{base_url}/projects/{project_id}/queries")).json(data)
}
