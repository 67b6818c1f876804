//! Completion reconciliation.
//!
//! Streamed text is a progress view only. Once a session has ended with
//! `is_completed`, the formation is re-read from the REST layer and that
//! document is what callers persist and display.

use forma_common::{FormaError, Formation, FormationSource};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::controller::SessionPhase;
use crate::progress::StreamingProgress;

#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    /// The session completed and the authoritative formation was fetched.
    Fetched(Formation),
    /// The session ended without a completion signal.
    Incomplete { error: Option<String> },
}

/// Wait for the current session to return to `Idle`, then reconcile.
///
/// Call this after [`SessionController::start`] has returned `true`. The
/// phase is already `Idle` before any session runs, so an earlier call
/// returns `Incomplete { error: None }` at once without fetching.
///
/// [`SessionController::start`]: crate::SessionController::start
pub async fn await_and_reconcile(
    mut phase: watch::Receiver<SessionPhase>,
    progress: watch::Receiver<StreamingProgress>,
    source: &dyn FormationSource,
    formation_id: &str,
) -> Result<Reconciled, FormaError> {
    phase
        .wait_for(|p| *p == SessionPhase::Idle)
        .await
        .map_err(|_| FormaError::Other("session controller dropped".into()))?;

    let (completed, error) = {
        let progress = progress.borrow();
        (progress.is_completed, progress.error.clone())
    };
    if !completed {
        debug!(formation_id, ?error, "session ended without completion");
        return Ok(Reconciled::Incomplete { error });
    }

    let formation = source.fetch_formation(formation_id).await?;
    info!(
        formation_id,
        lessons = formation.lesson_count(),
        "formation reconciled"
    );
    Ok(Reconciled::Fetched(formation))
}
