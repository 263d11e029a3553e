use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use crate::http::dataset::Dataset;

pub fn build(base_url: &str, client: &Client, project_id: &str, dataset: &Dataset) -> RequestBuilder {
    client.post(format!("{base_url}/projects/{project_id}/datasets")).json(dataset)
}
