use std::sync::Arc;

use crate::http::bigquery_client::BigqueryClient;
use crate::http::error::Error;
use crate::http::job;
use crate::http::job::get::GetJobRequest;
use crate::http::job::get_query_results::{GetQueryResultsRequest, GetQueryResultsResponse};
use crate::http::job::query::{QueryRequest, QueryResponse};
use crate::http::job::Job;

#[derive(Clone)]
pub struct BigqueryJobClient {
    inner: Arc<BigqueryClient>,
}

impl BigqueryJobClient {
    pub fn new(inner: Arc<BigqueryClient>) -> Self {
        Self { inner }
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn get(&self, project_id: &str, job_id: &str, data: &GetJobRequest) -> Result<Job, Error> {
        let builder = job::get::build(self.inner.endpoint(), self.inner.http(), project_id, job_id, data);
        self.inner.send(builder).await
    }

    /// Runs a query and returns the first page of its results.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn query(&self, project_id: &str, data: &QueryRequest) -> Result<QueryResponse, Error> {
        let builder = job::query::build(self.inner.endpoint(), self.inner.http(), project_id, data);
        self.inner.send(builder).await
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn get_query_results(
        &self,
        project_id: &str,
        job_id: &str,
        data: &GetQueryResultsRequest,
    ) -> Result<GetQueryResultsResponse, Error> {
        let builder = job::get_query_results::build(self.inner.endpoint(), self.inner.http(), project_id, job_id, data);
        self.inner.send(builder).await
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::http::bigquery_client::test::create_client;
    use crate::http::bigquery_job_client::BigqueryJobClient;
    use crate::http::job::get::GetJobRequest;
    use crate::http::job::get_query_results::GetQueryResultsRequest;
    use crate::http::job::query::QueryRequest;
    use crate::http::job::JobState;
    use crate::http::types::Value;

    #[tokio::test]
    async fn test_get_job() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bigquery/v2/projects/proj/jobs/job_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "bigquery#job",
                "jobReference": {"projectId": "proj", "jobId": "job_1"},
                "status": {"state": "RUNNING"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BigqueryJobClient::new(Arc::new(create_client(&server.uri())));
        let job = client.get("proj", "job_1", &GetJobRequest::default()).await.unwrap();
        assert_eq!(job.status.job_state(), JobState::Running);
    }

    #[tokio::test]
    async fn test_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bigquery/v2/projects/proj/queries"))
            .and(body_json(serde_json::json!({
                "kind": "bigquery#queryRequest",
                "query": "SELECT 1",
                "timeoutMs": 1000,
                "useQueryCache": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "bigquery#queryResponse",
                "schema": {"fields": [{"name": "f0_", "type": "INTEGER", "mode": "NULLABLE"}]},
                "jobReference": {"projectId": "proj", "jobId": "job_q", "location": "US"},
                "totalRows": "1",
                "rows": [{"f": [{"v": "1"}]}],
                "jobComplete": true,
                "cacheHit": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BigqueryJobClient::new(Arc::new(create_client(&server.uri())));
        let request = QueryRequest {
            kind: "bigquery#queryRequest".to_string(),
            query: "SELECT 1".to_string(),
            timeout_ms: Some(1000),
            use_query_cache: Some(false),
            ..Default::default()
        };
        let response = client.query("proj", &request).await.unwrap();
        assert!(response.job_complete);
        assert_eq!(response.total_rows, Some(1));
        assert_eq!(response.job_reference.job_id, "job_q");
        assert_eq!(response.rows[0].f[0].v, Value::String("1".to_string()));
    }

    #[tokio::test]
    async fn test_get_query_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bigquery/v2/projects/proj/queries/job_q"))
            .and(query_param("pageToken", "tok"))
            .and(query_param("startIndex", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jobReference": {"projectId": "proj", "jobId": "job_q"},
                "totalRows": "3",
                "rows": [{"f": [{"v": "c"}]}],
                "jobComplete": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BigqueryJobClient::new(Arc::new(create_client(&server.uri())));
        let request = GetQueryResultsRequest {
            start_index: Some(2),
            page_token: Some("tok".to_string()),
            ..Default::default()
        };
        let response = client.get_query_results("proj", "job_q", &request).await.unwrap();
        assert_eq!(response.rows.len(), 1);
        assert!(response.page_token.is_none());
    }
}
