//! Transport for the content-generation stream.

use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tracing::debug;

use crate::StreamError;

/// A response body as a stream of raw chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// What to generate: the course structure the agent fills with content.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub structure: serde_json::Value,
}

impl GenerationRequest {
    pub fn new(structure: serde_json::Value) -> Self {
        Self { structure }
    }

    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({ "structure": self.structure })
    }
}

/// Opens one streaming response per generation session.
#[async_trait]
pub trait ContentTransport: Send + Sync {
    async fn open(&self, request: &GenerationRequest) -> Result<ByteStream, StreamError>;
}

/// reqwest-backed transport: `POST {base_url}{path}` with a bearer token.
pub struct HttpTransport {
    endpoint: String,
    token: String,
    http: reqwest::Client,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl HttpTransport {
    /// Only the connect phase is bounded; a stalled body stalls the session
    /// until the connection itself fails.
    pub fn new(
        base_url: &str,
        path: &str,
        token: impl Into<String>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            endpoint: format!("{}{path}", base_url.trim_end_matches('/')),
            token: token.into(),
            http: reqwest::Client::builder()
                .connect_timeout(connect_timeout)
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContentTransport for HttpTransport {
    async fn open(&self, request: &GenerationRequest) -> Result<ByteStream, StreamError> {
        debug!(endpoint = %self.endpoint, "opening content stream");

        let response = self
            .http
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .bearer_auth(&self.token)
            .json(&request.body())
            .send()
            .await
            .map_err(|e| StreamError::Network(e.to_string()))?;

        let response = ensure_success(response).await?;
        Ok(Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(std::io::Error::other)),
        ))
    }
}

/// Fail fast on a non-2xx status, keeping a short excerpt of the body.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, StreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    Err(StreamError::Http {
        status: status.as_u16(),
        body: text.chars().take(200).collect(),
    })
}
