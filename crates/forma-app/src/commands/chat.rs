//! `forma chat`: one conversational turn with the course-design agent.

use std::io::Write;

use forma_common::{new_thread_id, FormaError};
use forma_config::FormaConfig;
use forma_stream::{AgentClient, AgentError, AgentHandler, AgentUpdate};
use serde_json::Value;
use tracing::debug;

/// Streams tokens straight to stdout.
#[derive(Default)]
struct TerminalHandler {
    thread_id: Option<String>,
    errors: usize,
    closed: bool,
}

impl AgentHandler for TerminalHandler {
    fn on_token(&mut self, token: &str) {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(token.as_bytes());
        let _ = out.flush();
    }

    fn on_update(&mut self, update: AgentUpdate) {
        debug!(node = %update.node, messages = update.messages.len(), "agent update");
    }

    fn on_values(&mut self, values: Value) {
        if let Some(thread_id) = values.get("thread_id").and_then(Value::as_str) {
            self.thread_id = Some(thread_id.to_string());
        }
    }

    fn on_error(&mut self, error: AgentError) {
        self.errors += 1;
        eprintln!("\nerror: {error}");
    }

    fn on_close(&mut self) {
        self.closed = true;
        println!();
    }
}

/// Returns `true` when the turn ended cleanly.
pub async fn chat(
    config: &FormaConfig,
    text: &str,
    thread: Option<String>,
) -> Result<bool, FormaError> {
    let thread_id = thread.unwrap_or_else(new_thread_id);
    let client = AgentClient::new(
        &config.api.base_url,
        &config.stream.agent_path,
        config.api.token.clone(),
        config.stream.connect_timeout(),
    );

    let mut handler = TerminalHandler::default();
    client.stream(text, Some(thread_id.as_str()), &mut handler).await?;
    if !handler.closed {
        println!();
    }

    let thread_id = handler.thread_id.take().unwrap_or(thread_id);
    eprintln!("thread: {thread_id}");
    Ok(handler.errors == 0)
}
