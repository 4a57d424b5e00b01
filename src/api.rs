use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Default backend address; override with `CAREERFLOW_API_URL`.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Header carrying the anonymous session identifier on every request.
pub const SESSION_HEADER: &str = "x-session-id";

/// Failure taxonomy for backend calls.
///
/// `Status` displays only the server-provided detail so that callers can
/// surface it verbatim to the user.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{detail}")]
    Status { status: StatusCode, detail: String },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Thin client over the CareerFlow backend. Cheap to clone; every request
/// carries the session header installed at construction time.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, session_id: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            SESSION_HEADER,
            HeaderValue::from_str(session_id).context("session id is not a valid header value")?,
        );
        let http = Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    pub async fn patch_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.patch(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.http.delete(self.url(path)).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let response = self.http.post(self.url(path)).multipart(form).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(ApiError::Parse)
    }

    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status,
            detail: extract_detail(status, &body),
        })
    }
}

/// Pulls the `detail` message out of an error body, falling back to the
/// HTTP status line when the body is absent or not the expected shape.
fn extract_detail(status: StatusCode, body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        detail: String,
    }
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.detail)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_session_header_sent_on_every_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jds"))
            .and(header(SESSION_HEADER, "session-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), "session-abc").unwrap();
        let body: Vec<serde_json::Value> = client.get_json("/api/jds").await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_error_detail_extracted_from_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jds"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(json!({"detail": "Invalid file"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), "s").unwrap();
        let err = client
            .get_json::<Vec<serde_json::Value>>("/api/jds")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid file");
        match err {
            ApiError::Status { status, .. } => assert_eq!(status.as_u16(), 422),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_falls_back_to_status_line() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jds"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), "s").unwrap();
        let err = client
            .get_json::<Vec<serde_json::Value>>("/api/jds")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/applications"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), "s").unwrap();
        let err = client
            .get_json::<Vec<serde_json::Value>>("/api/applications")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let base = format!("{}/", server.uri());
        let client = ApiClient::new(&base, "s").unwrap();
        let body: Vec<serde_json::Value> = client.get_json("/api/jds").await.unwrap();
        assert!(body.is_empty());
    }
}
