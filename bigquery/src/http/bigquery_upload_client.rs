use std::sync::Arc;

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use reqwest::{Body, Response, StatusCode};

use crate::http::bigquery_client::BigqueryClient;
use crate::http::error::{Error, ErrorWrapper};
use crate::http::job::Job;

const UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// Starts resumable upload sessions for load jobs.
#[derive(Clone)]
pub struct BigqueryUploadClient {
    inner: Arc<BigqueryClient>,
}

impl BigqueryUploadClient {
    pub fn new(inner: Arc<BigqueryClient>) -> Self {
        Self { inner }
    }

    /// https://cloud.google.com/bigquery/docs/reference/api-uploads#resumable
    ///
    /// Sends the job configuration and returns the session the data is uploaded to.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn start_resumable_upload(
        &self,
        project_id: &str,
        job: &Job,
        content_length: u64,
    ) -> Result<ResumableUploadClient, Error> {
        let url = format!("{}/projects/{}/jobs", self.inner.upload_endpoint(), project_id);
        let builder = self
            .inner
            .http()
            .post(url)
            .query(&[("uploadType", "resumable")])
            .header("X-Upload-Content-Type", UPLOAD_CONTENT_TYPE)
            .header("X-Upload-Content-Length", content_length)
            .json(job);
        let response = self.inner.with_headers(builder).await?.send().await?;
        let response = check_ok_status(response).await?;

        let location = response.headers().get(LOCATION).ok_or(Error::MissingLocation)?;
        let location = location
            .to_str()
            .map_err(|_| Error::InvalidLocation(format!("{location:?}")))?;
        let session_url = response
            .url()
            .join(location)
            .map_err(|e| Error::InvalidLocation(format!("{location}: {e}")))?;
        tracing::debug!(session_url = session_url.as_str(), "upload session opened");
        Ok(ResumableUploadClient {
            session_url: session_url.to_string(),
            inner: self.inner.clone(),
        })
    }
}

#[derive(Clone)]
pub struct ResumableUploadClient {
    session_url: String,
    inner: Arc<BigqueryClient>,
}

impl ResumableUploadClient {
    pub fn url(&self) -> &str {
        self.session_url.as_str()
    }

    /// Uploads the whole payload in one request and returns the accepted job.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn upload_single_chunk<T: Into<Body>>(&self, data: T, size: u64) -> Result<Job, Error> {
        let builder = self
            .inner
            .http()
            .put(&self.session_url)
            .header(CONTENT_TYPE, UPLOAD_CONTENT_TYPE)
            .header(CONTENT_LENGTH, size)
            .body(data);
        let response = self.inner.with_headers(builder).await?.send().await?;
        let response = check_ok_status(response).await?;
        self.inner.decode(response).await
    }
}

/// Upload endpoints answer 200 on success; anything else is an error, carrying the
/// service message when the body has one.
async fn check_ok_status(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }
    Err(response
        .json::<ErrorWrapper>()
        .await
        .map(|wrapper| Error::Response(wrapper.error))
        .unwrap_or(Error::UnexpectedStatus(status)))
}
