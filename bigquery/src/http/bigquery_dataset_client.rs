use std::sync::Arc;

use crate::http::bigquery_client::BigqueryClient;
use crate::http::dataset;
use crate::http::dataset::list::{DatasetOverview, ListDatasetsResponse};
use crate::http::dataset::{Dataset, DatasetReference};
use crate::http::error::Error;

#[derive(Clone)]
pub struct BigqueryDatasetClient {
    inner: Arc<BigqueryClient>,
}

impl BigqueryDatasetClient {
    pub fn new(inner: Arc<BigqueryClient>) -> Self {
        Self { inner }
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn create(&self, project_id: &str, metadata: &Dataset) -> Result<Dataset, Error> {
        let builder = dataset::insert::build(self.inner.endpoint(), self.inner.http(), project_id, metadata);
        self.inner.send(builder).await
    }

    /// Lists every dataset of the project, following page tokens.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn list(&self, project_id: &str) -> Result<Vec<DatasetOverview>, Error> {
        let mut page_token: Option<String> = None;
        let mut datasets = vec![];
        loop {
            let builder =
                dataset::list::build(self.inner.endpoint(), self.inner.http(), project_id, page_token.as_deref());
            let response: ListDatasetsResponse = self.inner.send(builder).await?;
            datasets.extend(response.datasets);
            match response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(datasets)
    }

    /// Creates the dataset unless the project already lists it.
    /// Returns true when a dataset was created.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn ensure(&self, project_id: &str, dataset_id: &str) -> Result<bool, Error> {
        let datasets = self.list(project_id).await?;
        if datasets
            .iter()
            .any(|d| d.dataset_reference.dataset_id == dataset_id)
        {
            tracing::debug!(project_id, dataset_id, "dataset already exists");
            return Ok(false);
        }
        let metadata = Dataset {
            dataset_reference: DatasetReference {
                dataset_id: dataset_id.to_string(),
                project_id: None,
            },
            ..Default::default()
        };
        self.create(project_id, &metadata).await?;
        tracing::info!(project_id, dataset_id, "created dataset");
        Ok(true)
    }
}
