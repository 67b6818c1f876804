use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Streaming endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Path of the content-generation stream (POST, chunked body).
    pub content_path: String,
    /// Path of the chat-agent SSE stream.
    pub agent_path: String,
    /// TCP/TLS connect timeout in seconds (valid range: 1-120).
    /// The stream itself has no read timeout.
    pub connect_timeout_secs: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            content_path: "/agent/content/stream".into(),
            agent_path: "/agent/runs/stream".into(),
            connect_timeout_secs: 10,
        }
    }
}

impl StreamConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.connect_timeout_secs))
    }
}
