use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::dataset::DatasetReference;

#[derive(Clone, PartialEq, Eq, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DatasetOverview {
    pub dataset_reference: DatasetReference,
    pub location: Option<String>,
}

/// One page of `datasets.list`. `datasets` is absent for a project without datasets.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListDatasetsResponse {
    #[serde(default)]
    pub datasets: Vec<DatasetOverview>,
    pub next_page_token: Option<String>,
}

pub fn build(base_url: &str, client: &Client, project_id: &str, page_token: Option<&str>) -> RequestBuilder {
    let url = format!("{base_url}/projects/{project_id}/datasets");
    let builder = client.get(url);
    match page_token {
        Some(token) => builder.query(&[("pageToken", token)]),
        None => builder,
    }
}
