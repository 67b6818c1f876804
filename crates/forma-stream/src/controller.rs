//! Single-flight generation session controller.
//!
//! The controller bridges the pull-based line stream into observable state:
//! one spawned task per session reads framed lines, folds each event into
//! [`StreamingProgress`] and publishes the result on a `watch` channel.
//! A new `start` while a session is in flight is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use forma_common::SessionId;
use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::event::{parse_data_line, EventParseError};
use crate::framing::frame_lines;
use crate::progress::StreamingProgress;
use crate::transport::{ContentTransport, GenerationRequest};

pub const CONNECT_FAILED: &str = "Failed to establish streaming connection";
pub const READ_FAILED: &str = "Stream reading error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    /// Request sent, no line received yet.
    Connecting,
    Streaming,
}

/// Held by the session task; releases the in-flight flag on every exit path.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
    phase: Arc<watch::Sender<SessionPhase>>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>, phase: &Arc<watch::Sender<SessionPhase>>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()?;
        Some(Self {
            flag: Arc::clone(flag),
            phase: Arc::clone(phase),
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.phase.send_replace(SessionPhase::Idle);
        self.flag.store(false, Ordering::Release);
    }
}

struct ActiveSession {
    id: SessionId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct SessionController {
    transport: Arc<dyn ContentTransport>,
    progress: Arc<watch::Sender<StreamingProgress>>,
    phase: Arc<watch::Sender<SessionPhase>>,
    in_flight: Arc<AtomicBool>,
    session: Mutex<Option<ActiveSession>>,
}

impl SessionController {
    pub fn new(transport: Arc<dyn ContentTransport>) -> Self {
        Self {
            transport,
            progress: Arc::new(watch::Sender::new(StreamingProgress::default())),
            phase: Arc::new(watch::Sender::new(SessionPhase::Idle)),
            in_flight: Arc::new(AtomicBool::new(false)),
            session: Mutex::new(None),
        }
    }

    /// Start generating content for `structure`.
    ///
    /// Returns `false` without doing anything if a session is already in
    /// flight. Must be called from within a tokio runtime.
    pub fn start(&self, structure: serde_json::Value) -> bool {
        let Some(guard) = InFlightGuard::acquire(&self.in_flight, &self.phase) else {
            debug!("generation already in flight, ignoring start");
            return false;
        };

        let id = SessionId::new();
        let cancel = CancellationToken::new();
        self.progress.send_replace(StreamingProgress::started());
        self.phase.send_replace(SessionPhase::Connecting);
        info!(session = %id, "generation session started");

        // Held until the slot is filled: the task may finish and a later
        // start may win the guard before `spawn` returns.
        let mut slot = self.lock_session();
        let handle = tokio::spawn(run_session(
            Arc::clone(&self.transport),
            GenerationRequest::new(structure),
            Arc::clone(&self.progress),
            cancel.clone(),
            guard,
            id.clone(),
        ));
        *slot = Some(ActiveSession { id, cancel, handle });
        true
    }

    /// Cancel the running session, if any, and wait until its connection
    /// is released and the phase is back to `Idle`.
    pub async fn stop(&self) {
        let Some(session) = self.lock_session().take() else {
            return;
        };
        debug!(session = %session.id, "stopping generation session");
        session.cancel.cancel();
        if let Err(e) = session.handle.await {
            warn!(session = %session.id, error = %e, "session task failed");
        }
    }

    pub fn clear_messages(&self) {
        self.progress.send_modify(StreamingProgress::clear_messages);
    }

    pub fn subscribe(&self) -> watch::Receiver<StreamingProgress> {
        self.progress.subscribe()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    pub fn progress(&self) -> StreamingProgress {
        self.progress.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.phase() != SessionPhase::Idle
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Option<ActiveSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(session) = self.lock_session().take() {
            session.cancel.cancel();
        }
    }
}

async fn run_session(
    transport: Arc<dyn ContentTransport>,
    request: GenerationRequest,
    progress: Arc<watch::Sender<StreamingProgress>>,
    cancel: CancellationToken,
    guard: InFlightGuard,
    id: SessionId,
) {
    read_stream(
        transport.as_ref(),
        &request,
        &progress,
        &guard.phase,
        &cancel,
        &id,
    )
    .await;
    progress.send_modify(|p| *p = std::mem::take(p).halted());
    info!(session = %id, "generation session ended");
    drop(guard);
}

async fn read_stream(
    transport: &dyn ContentTransport,
    request: &GenerationRequest,
    progress: &watch::Sender<StreamingProgress>,
    phase: &watch::Sender<SessionPhase>,
    cancel: &CancellationToken,
    id: &SessionId,
) {
    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        opened = transport.open(request) => opened,
    };
    let body = match opened {
        Ok(body) => body,
        Err(e) => {
            warn!(session = %id, error = %e, "failed to open content stream");
            progress.send_modify(|p| p.error = Some(CONNECT_FAILED.to_string()));
            return;
        }
    };

    let mut lines = frame_lines(body);
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(session = %id, "session cancelled");
                return;
            }
            next = lines.next() => next,
        };
        match next {
            None => {
                debug!(session = %id, "content stream closed");
                return;
            }
            Some(Err(e)) => {
                warn!(session = %id, error = %e, "content stream read failed");
                progress.send_modify(|p| p.error = Some(READ_FAILED.to_string()));
                return;
            }
            Some(Ok(line)) => {
                phase.send_if_modified(|current| {
                    let first = *current == SessionPhase::Connecting;
                    if first {
                        *current = SessionPhase::Streaming;
                    }
                    first
                });
                dispatch(progress, &line);
            }
        }
    }
}

fn dispatch(progress: &watch::Sender<StreamingProgress>, line: &str) {
    match parse_data_line(line) {
        None => {}
        Some(Ok(event)) => {
            debug!(kind = event.kind(), "stream event");
            progress.send_modify(|p| *p = std::mem::take(p).reduce(event));
        }
        Some(Err(e)) => {
            if matches!(e, EventParseError::UnknownKind(_)) {
                debug!(error = %e, "skipping stream line");
            } else {
                warn!(error = %e, "skipping malformed stream line");
            }
            progress.send_modify(|p| p.skipped_lines += 1);
        }
    }
}
