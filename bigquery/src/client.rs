use std::sync::Arc;

use reqwest_middleware::ClientWithMiddleware;
use token_source::{NoopTokenSourceProvider, TokenSourceProvider};

use crate::dumper::{DumpConfig, DumpSummary};
use crate::error::Error;
use crate::http::bigquery_client::BigqueryClient;
use crate::http::bigquery_dataset_client::BigqueryDatasetClient;
use crate::http::bigquery_job_client::BigqueryJobClient;
use crate::http::bigquery_upload_client::BigqueryUploadClient;
use crate::http::job::JobReference;
use crate::loader::LoadConfig;

pub const DEFAULT_ENDPOINT: &str = "https://bigquery.googleapis.com";

#[derive(Debug)]
pub struct ClientConfig {
    pub http: ClientWithMiddleware,
    pub endpoint: String,
    pub token_source_provider: Box<dyn TokenSourceProvider>,
    pub project_id: Option<String>,
    /// Logs every response body.
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            http: reqwest_middleware::ClientBuilder::new(reqwest::Client::default()).build(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token_source_provider: Box::new(NoopTokenSourceProvider {}),
            project_id: None,
            debug: false,
        }
    }
}

impl ClientConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Builds the transport every call goes through. A proxy, when given, is applied
/// to all requests of this client and nothing else.
pub fn http_client(proxy: Option<&str>) -> Result<reqwest::Client, Error> {
    let mut builder = reqwest::Client::builder();
    if let Some(proxy) = proxy.filter(|p| !p.is_empty()) {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| Error::InvalidParameter(format!("invalid proxy {proxy}: {e}")))?;
        builder = builder.proxy(proxy);
    }
    builder.build().map_err(|e| Error::Http(e.into()))
}

#[cfg(feature = "auth")]
pub use bqxfer_auth;

#[cfg(feature = "auth")]
impl ClientConfig {
    /// Reads a service account key and exchanges it for a token, all through `proxy`.
    pub async fn new_with_credentials_file(
        path: impl AsRef<std::path::Path>,
        proxy: Option<&str>,
    ) -> Result<Self, Error> {
        let credentials = bqxfer_auth::credentials::CredentialsFile::new_from_file(path).await?;
        Self::new_with_credentials(credentials, proxy).await
    }

    pub async fn new_with_credentials(
        credentials: bqxfer_auth::credentials::CredentialsFile,
        proxy: Option<&str>,
    ) -> Result<Self, Error> {
        let http = http_client(proxy)?;
        let scopes = crate::http::bigquery_client::SCOPES;
        let auth_config = bqxfer_auth::project::Config::default()
            .with_scopes(&scopes)
            .with_http_client(http.clone());
        let tsp =
            bqxfer_auth::token::DefaultTokenSourceProvider::new_with_credentials(auth_config, Box::new(credentials))
                .await?;
        Ok(Self {
            http: reqwest_middleware::ClientBuilder::new(http).build(),
            project_id: tsp.project_id.clone(),
            token_source_provider: Box::new(tsp),
            ..Default::default()
        })
    }
}

pub struct Client {
    dataset_client: BigqueryDatasetClient,
    job_client: BigqueryJobClient,
    upload_client: BigqueryUploadClient,
    project_id: Option<String>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        let ts = config.token_source_provider.token_source();
        let client = Arc::new(BigqueryClient::new(
            ts,
            config.endpoint.as_str(),
            config.http,
            config.debug,
        ));
        Self {
            dataset_client: BigqueryDatasetClient::new(client.clone()),
            job_client: BigqueryJobClient::new(client.clone()),
            upload_client: BigqueryUploadClient::new(client),
            project_id: config.project_id,
        }
    }

    /// Project of the credentials the client was built from, if known.
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn dataset(&self) -> &BigqueryDatasetClient {
        &self.dataset_client
    }

    pub fn job(&self) -> &BigqueryJobClient {
        &self.job_client
    }

    pub fn upload(&self) -> &BigqueryUploadClient {
        &self.upload_client
    }

    /// Uploads the source file into the destination table and waits for the load job.
    pub async fn load(&self, config: &LoadConfig) -> Result<JobReference, Error> {
        crate::loader::run(self, config).await
    }

    /// Runs the query and writes every result row to the output file.
    pub async fn dump(&self, config: &DumpConfig) -> Result<DumpSummary, Error> {
        crate::dumper::run(self, config).await
    }
}
