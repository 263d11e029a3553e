//! Running a query and writing its result rows to a local file.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::Client;
use crate::error::Error;
use crate::http::job::get_query_results::GetQueryResultsRequest;
use crate::http::job::query::{QueryRequest, QueryResponse};
use crate::http::job::JobReference;
use crate::loader::required;
use crate::output::{parse_delimiter, write_csv, write_json, OutputFormat};
use crate::record::RowDecoder;

#[derive(Clone, Debug, Default)]
pub struct DumpConfig {
    pub project_id: String,
    pub credentials_path: String,
    pub output_path: String,
    /// `json` or `csv`, in any case.
    pub format: String,
    /// CSV only: empty for a comma, `tab` for a tab, otherwise the first character.
    pub delimiter: String,
    pub query: String,
    pub proxy: Option<String>,
    pub endpoint: Option<String>,
    /// JSON only: indent with tabs.
    pub pretty: bool,
    /// CSV only: write the column names first.
    pub header: bool,
    /// How long the service may hold each query call open. 0 keeps the service default.
    pub timeout_ms: i64,
    /// Bypass the query cache.
    pub no_cache: bool,
    /// Overall limit on waiting for an incomplete query job. `None` waits until it completes.
    pub wait_timeout: Option<Duration>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DumpSummary {
    pub total_rows: usize,
    pub output_path: PathBuf,
}

enum Target {
    Json { pretty: bool },
    Csv { delimiter: u8, header: bool },
}

impl DumpConfig {
    fn validate(&self) -> Result<Target, Error> {
        required(&[
            ("project", &self.project_id),
            ("output", &self.output_path),
            ("format", &self.format),
            ("query", &self.query),
        ])?;
        Ok(match self.format.parse::<OutputFormat>()? {
            OutputFormat::Json => Target::Json { pretty: self.pretty },
            OutputFormat::Csv => Target::Csv {
                delimiter: parse_delimiter(&self.delimiter)?,
                header: self.header,
            },
        })
    }

    fn timeout_ms(&self) -> Option<i64> {
        (self.timeout_ms != 0).then_some(self.timeout_ms)
    }
}

/// Builds a client from the service account key in `config` and dumps the query result.
#[cfg(feature = "auth")]
pub async fn dump(config: DumpConfig) -> Result<DumpSummary, Error> {
    config.validate()?;
    required(&[("credentials", &config.credentials_path)])?;
    let client_config =
        crate::client::ClientConfig::new_with_credentials_file(&config.credentials_path, config.proxy.as_deref())
            .await?;
    let client_config = match &config.endpoint {
        Some(endpoint) => client_config.with_endpoint(endpoint.as_str()),
        None => client_config,
    };
    Client::new(client_config).dump(&config).await
}

pub(crate) async fn run(client: &Client, config: &DumpConfig) -> Result<DumpSummary, Error> {
    let target = config.validate()?;
    let project_id = config.project_id.as_str();

    let request = QueryRequest {
        kind: "bigquery#queryRequest".to_string(),
        query: config.query.clone(),
        timeout_ms: config.timeout_ms(),
        use_query_cache: config.no_cache.then_some(false),
        ..Default::default()
    };
    let page = client.job().query(project_id, &request).await?;
    if let Some(err) = Error::from_errors(&page.errors) {
        return Err(err);
    }
    let job = page.job_reference.to_string();
    let mut page = match config.wait_timeout {
        Some(limit) => tokio::time::timeout(limit, wait_for_completion(client, config, page))
            .await
            .map_err(|_| Error::Timeout(job))??,
        None => wait_for_completion(client, config, page).await?,
    };

    let schema = page.schema.take().ok_or(Error::NoSchema)?;
    let total = page.total_rows.unwrap_or_default();
    let job = page.job_reference.clone();
    let mut token = page.page_token.take();
    let mut rows = std::mem::take(&mut page.rows);
    tracing::info!(job = %job, total, first_page = rows.len(), "query done");

    while (rows.len() as i64) < total {
        let retrieved = rows.len() as i64;
        let request = GetQueryResultsRequest {
            start_index: Some(retrieved),
            page_token: token.take(),
            timeout_ms: config.timeout_ms(),
            location: job.location.clone(),
            ..Default::default()
        };
        let next = fetch(client, project_id, &job, &request).await?;
        if next.rows.is_empty() {
            return Err(Error::IncompleteResults { retrieved, total });
        }
        tracing::debug!(job = %job, retrieved, page = next.rows.len(), "fetched page");
        token = next.page_token;
        rows.extend(next.rows);
    }

    let decoder = RowDecoder::new(schema.fields);
    let records = decoder.decode_all(&rows)?;
    let path = PathBuf::from(&config.output_path);
    let output_path = match target {
        Target::Json { pretty } => write_json(&path, &records, pretty)?,
        Target::Csv { delimiter, header } => {
            write_csv(&path, &decoder.sorted_column_names(), &records, delimiter, header)?
        }
    };
    tracing::info!(rows = records.len(), output = %output_path.display(), "output written");
    Ok(DumpSummary {
        total_rows: records.len(),
        output_path,
    })
}

/// Polls getQueryResults until the job behind `page` reports completion.
async fn wait_for_completion(
    client: &Client,
    config: &DumpConfig,
    mut page: QueryResponse,
) -> Result<QueryResponse, Error> {
    while !page.job_complete {
        tracing::debug!(job = %page.job_reference, "query not complete yet");
        let request = GetQueryResultsRequest {
            timeout_ms: config.timeout_ms(),
            location: page.job_reference.location.clone(),
            ..Default::default()
        };
        page = fetch(client, &config.project_id, &page.job_reference, &request).await?;
    }
    Ok(page)
}

async fn fetch(
    client: &Client,
    project_id: &str,
    job: &JobReference,
    request: &GetQueryResultsRequest,
) -> Result<QueryResponse, Error> {
    let page = client.job().get_query_results(project_id, &job.job_id, request).await?;
    match Error::from_errors(&page.errors) {
        Some(err) => Err(err),
        None => Ok(page),
    }
}
