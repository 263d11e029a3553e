use std::sync::Arc;

use reqwest::Response;
use reqwest_middleware::{ClientWithMiddleware as Client, RequestBuilder};

use token_source::TokenSource;

use crate::http::error::{Error, ErrorWrapper};

pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/bigquery",
    "https://www.googleapis.com/auth/cloud-platform",
];

#[derive(Debug, Clone)]
pub struct BigqueryClient {
    ts: Arc<dyn TokenSource>,
    endpoint: String,
    upload_endpoint: String,
    http: Client,
    debug: bool,
}

impl BigqueryClient {
    pub(crate) fn new(ts: Arc<dyn TokenSource>, endpoint: &str, http: Client, debug: bool) -> Self {
        Self {
            ts,
            endpoint: format!("{endpoint}/bigquery/v2"),
            upload_endpoint: format!("{endpoint}/upload/bigquery/v2"),
            http,
            debug,
        }
    }

    pub(crate) fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    pub(crate) fn upload_endpoint(&self) -> &str {
        self.upload_endpoint.as_str()
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) async fn with_headers(&self, builder: RequestBuilder) -> Result<RequestBuilder, Error> {
        let token = self.ts.token().await.map_err(Error::TokenSource)?;
        Ok(builder
            .header("X-Goog-Api-Client", "rust")
            .header(reqwest::header::USER_AGENT, "bqxfer")
            .header(reqwest::header::AUTHORIZATION, token))
    }

    pub async fn send<T>(&self, builder: RequestBuilder) -> Result<T, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let request = self.with_headers(builder).await?;
        let response = request.send().await?;
        let response = Self::check_response_status(response).await?;
        self.decode(response).await
    }

    pub(crate) async fn decode<T>(&self, response: Response) -> Result<T, Error>
    where
        T: serde::de::DeserializeOwned,
    {
        if self.debug {
            let text = response.text().await?;
            tracing::info!("{}", text);
            Ok(serde_json::from_str(text.as_str())?)
        } else {
            Ok(response.json().await?)
        }
    }

    /// Checks whether an HTTP response is successful and returns it, or returns an error.
    pub(crate) async fn check_response_status(response: Response) -> Result<Response, Error> {
        // Check the status code, returning the response if it is not an error.
        let error = match response.error_for_status_ref() {
            Ok(_) => return Ok(response),
            Err(error) => error,
        };

        // try to extract a response error, falling back to the status error if it can not be parsed.
        Err(response
            .json::<ErrorWrapper>()
            .await
            .map(|wrapper| Error::Response(wrapper.error))
            .unwrap_or(Error::HttpClient(error)))
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;

    use async_trait::async_trait;
    use token_source::TokenSource;

    use crate::http::bigquery_client::BigqueryClient;

    pub const TEST_TOKEN: &str = "Bearer test_token";

    #[derive(Debug)]
    pub struct StaticTokenSource;

    #[async_trait]
    impl TokenSource for StaticTokenSource {
        async fn token(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Ok(TEST_TOKEN.to_string())
        }
    }

    #[derive(Debug)]
    pub struct FailingTokenSource;

    #[async_trait]
    impl TokenSource for FailingTokenSource {
        async fn token(&self) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Err("no credentials".into())
        }
    }

    pub fn create_client(endpoint: &str) -> BigqueryClient {
        BigqueryClient::new(
            Arc::new(StaticTokenSource),
            endpoint,
            reqwest_middleware::ClientBuilder::new(reqwest::Client::new()).build(),
            false,
        )
    }

    #[ctor::ctor]
    fn init() {
        let filter = tracing_subscriber::filter::EnvFilter::from_default_env()
            .add_directive("bqxfer=trace".parse().unwrap());
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    }

    mod send {
        use std::sync::Arc;

        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        use super::*;
        use crate::http::error::Error;

        #[derive(serde::Deserialize, Debug)]
        struct Pong {
            ok: bool,
        }

        #[tokio::test]
        async fn test_send_adds_authorization() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/bigquery/v2/ping"))
                .and(header("authorization", TEST_TOKEN))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
                .expect(1)
                .mount(&server)
                .await;

            let client = create_client(&server.uri());
            let builder = client.http().get(format!("{}/ping", client.endpoint()));
            let pong: Pong = client.send(builder).await.unwrap();
            assert!(pong.ok);
        }

        #[tokio::test]
        async fn test_send_error_response() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                    "error": {"code": 404, "message": "Not found: Dataset p:d", "errors": []}
                })))
                .mount(&server)
                .await;

            let client = create_client(&server.uri());
            let builder = client.http().get(format!("{}/ping", client.endpoint()));
            match client.send::<Pong>(builder).await {
                Err(Error::Response(e)) => {
                    assert_eq!(e.code, 404);
                    assert_eq!(e.message, "Not found: Dataset p:d");
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_send_error_without_body() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(503))
                .mount(&server)
                .await;

            let client = create_client(&server.uri());
            let builder = client.http().get(format!("{}/ping", client.endpoint()));
            assert!(matches!(client.send::<Pong>(builder).await, Err(Error::HttpClient(_))));
        }

        #[tokio::test]
        async fn test_token_source_failure() {
            let client = BigqueryClient::new(
                Arc::new(FailingTokenSource),
                "http://127.0.0.1:1",
                reqwest_middleware::ClientBuilder::new(reqwest::Client::new()).build(),
                false,
            );
            let builder = client.http().get(format!("{}/ping", client.endpoint()));
            assert!(matches!(client.send::<Pong>(builder).await, Err(Error::TokenSource(_))));
        }
    }
}
