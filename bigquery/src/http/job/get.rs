use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

#[derive(Clone, PartialEq, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetJobRequest {
    /// Location echoed in the job reference; needed outside the US and EU multi-regions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

pub fn build(base_url: &str, client: &Client, project_id: &str, job_id: &str, data: &GetJobRequest) -> RequestBuilder {
    client
        .get(format!("{base_url}/projects/{project_id}/jobs/{job_id}"))
        .query(data)
}
