//! Streaming core for Forma course generation.
//!
//! Two consumers share one transport/framing layer:
//! - the content-generation stream: a POST-initiated chunked body whose
//!   `data: [kind, payload]` lines are folded into a [`StreamingProgress`]
//!   by a pure reducer and published by a single-flight
//!   [`SessionController`]
//! - the chat-agent stream: a classic SSE endpoint whose events are routed
//!   to an [`AgentHandler`]
//!
//! Once a generation session completes, [`reconcile`] re-reads the
//! authoritative formation over REST; streamed text is only a progress view.

pub mod agent;
pub mod controller;
pub mod event;
pub mod framing;
pub mod progress;
pub mod reconcile;
pub mod sse;
pub mod transport;

pub use agent::{dispatch_agent_stream, AgentClient, AgentError, AgentHandler, AgentUpdate};
pub use controller::{SessionController, SessionPhase};
pub use event::{parse_data_line, EventParseError, StreamEvent};
pub use framing::{frame_lines, DataLineCodec};
pub use progress::{is_lesson_completion, CurrentLesson, StreamingProgress, LESSON_COMPLETION_MARKERS};
pub use reconcile::{await_and_reconcile, Reconciled};
pub use transport::{ByteStream, ContentTransport, GenerationRequest, HttpTransport};

use forma_common::FormaError;

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("read error: {0}")]
    Read(String),
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::Read(err.to_string())
    }
}

impl From<StreamError> for FormaError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Network(msg) => FormaError::Network(msg),
            other => FormaError::Stream(other.to_string()),
        }
    }
}
