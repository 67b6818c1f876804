//! Chat-agent stream used to elicit a course structure conversationally.
//!
//! Each SSE event carries a JSON `[kind, payload]` tuple, like the content
//! stream, except that a literal `[DONE]` ends the turn explicitly.

use std::fmt;
use std::ops::ControlFlow;
use std::time::Duration;

use forma_common::json::{nullable_string, text_or_json};
use forma_common::FormaError;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::sse::parse_sse_stream;
use crate::transport::ByteStream;
use crate::StreamError;

pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "text_or_json")]
    pub content: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<AgentToolCall>,
    #[serde(default)]
    pub tool_call_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// State change reported by one agent graph node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentUpdate {
    #[serde(default)]
    pub node: String,
    #[serde(default)]
    pub messages: Vec<AgentMessage>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub thread_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("agent rejected the request (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: Value },
    #[error("agent unavailable (HTTP {status})")]
    Unavailable { status: u16 },
    #[error("agent error: {0}")]
    Server(String),
    #[error("failed to parse message from server: {0}")]
    Parse(String),
    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl From<AgentError> for FormaError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Stream(stream) => stream.into(),
            other => FormaError::Api(other.to_string()),
        }
    }
}

/// Receives routed chat-agent events. Every callback is optional.
pub trait AgentHandler: Send {
    fn on_token(&mut self, _token: &str) {}
    fn on_update(&mut self, _update: AgentUpdate) {}
    fn on_values(&mut self, _values: Value) {}
    fn on_error(&mut self, _error: AgentError) {}
    fn on_close(&mut self) {}
}

pub struct AgentClient {
    endpoint: String,
    token: String,
    http: reqwest::Client,
}

impl fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentClient")
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl AgentClient {
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

    pub fn request_body(text: &str, thread_id: Option<&str>) -> Value {
        json!({
            "input": {
                "messages": [{ "type": "human", "content": text }]
            },
            "config": {
                "configurable": { "thread_id": thread_id }
            },
            "stream_mode": ["messages", "updates", "values"]
        })
    }

    /// Send one human message and route the reply stream to `handler`.
    ///
    /// Connection and HTTP failures are returned; problems inside the
    /// stream are reported through [`AgentHandler::on_error`].
    pub async fn stream(
        &self,
        text: &str,
        thread_id: Option<&str>,
        handler: &mut dyn AgentHandler,
    ) -> Result<(), AgentError> {
        debug!(endpoint = %self.endpoint, ?thread_id, "opening agent stream");
        let mut request = self
            .http
            .post(&self.endpoint)
            .header("Accept", "text/event-stream")
            .json(&Self::request_body(text, thread_id));
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| StreamError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(reject(status, response).await);
        }

        let body: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(std::io::Error::other)),
        );
        dispatch_agent_stream(body, handler).await
    }
}

/// Client errors other than 429 carry a JSON detail; anything else is
/// reported as the service being unavailable.
async fn reject(status: reqwest::StatusCode, response: reqwest::Response) -> AgentError {
    let code = status.as_u16();
    if status.is_client_error() && status != reqwest::StatusCode::TOO_MANY_REQUESTS {
        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str(&text).unwrap_or(Value::String(text));
        AgentError::Rejected {
            status: code,
            detail,
        }
    } else {
        AgentError::Unavailable { status: code }
    }
}

/// Route every event of an agent SSE body to `handler` until `[DONE]` or
/// the end of the body.
pub async fn dispatch_agent_stream(
    body: ByteStream,
    handler: &mut dyn AgentHandler,
) -> Result<(), AgentError> {
    let flow = parse_sse_stream(body, |event| {
        if event.data == DONE_SENTINEL {
            handler.on_close();
            return ControlFlow::Break(());
        }
        route(&event.data, handler);
        ControlFlow::Continue(())
    })
    .await?;
    if flow.is_continue() {
        debug!("agent stream ended without {DONE_SENTINEL}");
    }
    Ok(())
}

fn route(data: &str, handler: &mut dyn AgentHandler) {
    let (kind, payload) = match serde_json::from_str::<(String, Value)>(data) {
        Ok(tuple) => tuple,
        Err(e) => {
            warn!(error = %e, "failed to parse agent event");
            handler.on_error(AgentError::Parse(e.to_string()));
            return;
        }
    };

    match kind.as_str() {
        "messages" => match token_text(&payload) {
            Some(token) => handler.on_token(token),
            None => handler.on_error(AgentError::Parse(format!(
                "unexpected token payload: {payload}"
            ))),
        },
        "updates" => match serde_json::from_value(payload) {
            Ok(update) => handler.on_update(update),
            Err(e) => handler.on_error(AgentError::Parse(e.to_string())),
        },
        "values" => handler.on_values(payload),
        "error" => {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| payload.to_string());
            handler.on_error(AgentError::Server(message));
        }
        other => debug!(kind = other, "ignoring agent event"),
    }
}

/// A token is a bare string, or a message chunk object with `content`.
fn token_text(payload: &Value) -> Option<&str> {
    match payload {
        Value::String(token) => Some(token),
        Value::Object(chunk) => chunk.get("content").and_then(Value::as_str),
        _ => None,
    }
}
