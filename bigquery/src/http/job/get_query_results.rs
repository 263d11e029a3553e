use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

pub use crate::http::job::query::QueryResponse as GetQueryResultsResponse;

/// Query string of `jobs.getQueryResults`.
#[derive(Clone, PartialEq, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetQueryResultsRequest {
    /// Zero-based row to start the page at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<i64>,
    /// Required for jobs outside the US and EU multi-regions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

pub fn build(
    base_url: &str,
    client: &Client,
    project_id: &str,
    job_id: &str,
    data: &GetQueryResultsRequest,
) -> RequestBuilder {
    client
        .get(format!("{base_url}/projects/{project_id}/queries/{job_id}"))
        .query(data)
}
