//! Loading a local file into a table through a resumable upload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::client::Client;
use crate::error::Error;
use crate::http::job::get::GetJobRequest;
use crate::http::job::{Job, JobConfiguration, JobConfigurationLoad, JobReference, JobState, WriteDisposition};
use crate::http::table::{SourceFormat, TableFieldSchema, TableReference, TableSchema};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// Delay before each job status check.
    pub poll_interval: Duration,
    /// Overall limit on waiting for the job. `None` waits until the job finishes.
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
    pub write_disposition: Option<WriteDisposition>,
    /// Header rows to skip in a CSV source.
    pub skip_leading_rows: Option<i64>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            cancel: CancellationToken::new(),
            write_disposition: None,
            skip_leading_rows: None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoadConfig {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
    pub credentials_path: String,
    pub schema_path: String,
    pub source_path: String,
    pub proxy: Option<String>,
    /// Overrides the service endpoint, e.g. for a private endpoint.
    pub endpoint: Option<String>,
    pub options: LoadOptions,
}

impl LoadConfig {
    /// Checks the parameters a built client needs and picks the source format.
    fn validate(&self) -> Result<SourceFormat, Error> {
        required(&[
            ("project", &self.project_id),
            ("dataset", &self.dataset_id),
            ("table", &self.table_id),
            ("schema", &self.schema_path),
            ("source", &self.source_path),
        ])?;
        SourceFormat::from_path(&self.source_path).ok_or_else(|| {
            Error::InvalidParameter(format!(
                "unsupported source file {}, expected .json or .csv",
                self.source_path
            ))
        })
    }
}

pub(crate) fn required(params: &[(&str, &str)]) -> Result<(), Error> {
    let missing: Vec<&str> = params.iter().filter(|(_, v)| v.is_empty()).map(|(k, _)| *k).collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!("missing {}", missing.join(", "))))
    }
}

/// Builds a client from the service account key in `config` and loads the source file.
#[cfg(feature = "auth")]
pub async fn load(config: LoadConfig) -> Result<JobReference, Error> {
    config.validate()?;
    required(&[("credentials", &config.credentials_path)])?;
    let setup = crate::client::ClientConfig::new_with_credentials_file(&config.credentials_path, config.proxy.as_deref());
    let client_config = tokio::select! {
        _ = config.options.cancel.cancelled() => return Err(cancelled(&config)),
        client_config = setup => client_config?,
    };
    let client_config = match &config.endpoint {
        Some(endpoint) => client_config.with_endpoint(endpoint.as_str()),
        None => client_config,
    };
    Client::new(client_config).load(&config).await
}

pub(crate) async fn run(client: &Client, config: &LoadConfig) -> Result<JobReference, Error> {
    let format = config.validate()?;
    // the cancel token covers the upload as well as the wait
    let job_ref = tokio::select! {
        _ = config.options.cancel.cancelled() => return Err(cancelled(config)),
        submitted = submit(client, config, format) => submitted?,
    };
    tracing::info!(job = %job_ref, "load job accepted");

    wait_for_job(client, &job_ref, &config.options).await?;
    tracing::info!(job = %job_ref, table = config.table_id.as_str(), "load job done");
    Ok(job_ref)
}

fn cancelled(config: &LoadConfig) -> Error {
    Error::Cancelled(format!("load into {}:{}.{}", config.project_id, config.dataset_id, config.table_id))
}

/// Ensures the dataset, uploads the source and returns the accepted job.
async fn submit(client: &Client, config: &LoadConfig, format: SourceFormat) -> Result<JobReference, Error> {
    let project_id = config.project_id.as_str();

    client.dataset().ensure(project_id, &config.dataset_id).await?;

    let fields = read_schema(Path::new(&config.schema_path)).await?;
    let data = read_file(Path::new(&config.source_path)).await?;
    let size = data.len() as u64;

    let job = Job {
        configuration: JobConfiguration {
            load: Some(JobConfigurationLoad {
                source_format: Some(format),
                schema: Some(TableSchema { fields }),
                destination_table: TableReference {
                    project_id: config.project_id.clone(),
                    dataset_id: config.dataset_id.clone(),
                    table_id: config.table_id.clone(),
                },
                write_disposition: config.options.write_disposition.clone(),
                skip_leading_rows: config.options.skip_leading_rows,
            }),
            ..Default::default()
        },
        ..Default::default()
    };

    let session = client.upload().start_resumable_upload(project_id, &job, size).await?;
    tracing::info!(source = config.source_path.as_str(), size, "uploading");
    let job = session.upload_single_chunk(data, size).await?;

    let job_ref = job.job_reference.unwrap_or_default();
    if job_ref.project_id != config.project_id {
        return Err(Error::ProjectMismatch {
            returned: job_ref.project_id,
            configured: config.project_id.clone(),
        });
    }
    Ok(job_ref)
}

async fn read_schema(path: &Path) -> Result<Vec<TableFieldSchema>, Error> {
    let data = read_file(path).await?;
    serde_json::from_slice(&data).map_err(|source| Error::Schema {
        path: PathBuf::from(path),
        source,
    })
}

async fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    tokio::fs::read(path).await.map_err(|source| Error::Io {
        path: PathBuf::from(path),
        source,
    })
}

/// Polls the job every `poll_interval` until it is DONE.
pub async fn wait_for_job(client: &Client, job_ref: &JobReference, options: &LoadOptions) -> Result<(), Error> {
    let deadline = options.timeout.map(|t| tokio::time::Instant::now() + t);
    let request = GetJobRequest {
        location: job_ref.location.clone(),
    };
    loop {
        let timeout = async {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = options.cancel.cancelled() => {
                return Err(Error::Cancelled(format!("wait for job {job_ref}")))
            }
            _ = timeout => return Err(Error::Timeout(job_ref.to_string())),
            _ = tokio::time::sleep(options.poll_interval) => {}
        }

        let job = client
            .job()
            .get(&job_ref.project_id, &job_ref.job_id, &request)
            .await?;
        if let Some(err) = Error::from_errors(job.status.all_errors()) {
            return Err(err);
        }
        match job.status.job_state() {
            JobState::Pending | JobState::Running => {
                tracing::debug!(job = %job_ref, state = job.status.state.as_str(), "waiting");
            }
            JobState::Done => return Ok(()),
            JobState::Unknown(state) => {
                return Err(Error::UnknownJobState {
                    state,
                    job: job_ref.to_string(),
                })
            }
        }
    }
}
