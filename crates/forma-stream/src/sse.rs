//! Server-Sent Events parser used by the chat-agent stream.
//!
//! Events are blank-line delimited; multiple `data:` lines of one event are
//! joined with `\n`. Lines come from the same [`frame_lines`] framing as the
//! content stream, so chunk boundaries are handled in one place.

use std::ops::ControlFlow;

use futures_util::StreamExt;

use crate::framing::frame_lines;
use crate::transport::ByteStream;
use crate::StreamError;

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    /// The `event:` field, if the server set one.
    pub event: Option<String>,
    pub data: String,
}

/// Fields of the event being assembled.
#[derive(Debug, Default)]
struct PendingEvent {
    event: Option<String>,
    data: Vec<String>,
}

impl PendingEvent {
    /// Feed one line; a blank line completes the event, if it had data.
    fn push_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.finish();
        }
        match line.split_once(':') {
            Some(("event", value)) => self.event = Some(field_value(value).to_string()),
            Some(("data", value)) => self.data.push(field_value(value).to_string()),
            // id, retry and `:` comments
            _ => {}
        }
        None
    }

    fn finish(&mut self) -> Option<SseEvent> {
        let PendingEvent { event, data } = std::mem::take(self);
        (!data.is_empty()).then(|| SseEvent {
            event,
            data: data.join("\n"),
        })
    }
}

fn field_value(value: &str) -> &str {
    value.strip_prefix(' ').unwrap_or(value)
}

/// Parse an SSE body, calling `on_event` for each event until the body ends
/// or the callback breaks.
///
/// Returns `Break` when the callback stopped the stream and `Continue` when
/// the body ran out. An event still open at the end of the body is
/// delivered as if a blank line had followed it.
pub async fn parse_sse_stream(
    body: ByteStream,
    mut on_event: impl FnMut(SseEvent) -> ControlFlow<()>,
) -> Result<ControlFlow<()>, StreamError> {
    let mut lines = frame_lines(body);
    let mut pending = PendingEvent::default();

    while let Some(line) = lines.next().await {
        if let Some(event) = pending.push_line(&line?) {
            if on_event(event).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
    }

    Ok(match pending.finish() {
        Some(event) => on_event(event),
        None => ControlFlow::Continue(()),
    })
}
