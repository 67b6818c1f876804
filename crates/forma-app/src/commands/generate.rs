//! `forma generate`: stream lesson content, then reconcile.

use std::path::Path;
use std::sync::Arc;

use forma_api::FormationClient;
use forma_common::{FormaError, Formation};
use forma_config::FormaConfig;
use forma_stream::{await_and_reconcile, HttpTransport, Reconciled, SessionController};
use serde_json::Value;
use tracing::{info, warn};

use crate::reporter::ProgressReporter;

/// Read the course structure to generate from a JSON file.
pub fn read_structure(path: &Path) -> Result<Value, FormaError> {
    let text = std::fs::read_to_string(path)?;
    let structure: Value = serde_json::from_str(&text).map_err(|e| {
        FormaError::Other(format!("invalid structure file {}: {e}", path.display()))
    })?;
    if !structure.is_object() {
        return Err(FormaError::Other(format!(
            "structure file {} must hold a JSON object",
            path.display()
        )));
    }
    Ok(structure)
}

/// Returns `true` when the formation was generated and re-fetched.
pub async fn generate(
    config: &FormaConfig,
    formation_id: &str,
    structure_path: &Path,
) -> Result<bool, FormaError> {
    let structure = read_structure(structure_path)?;
    let transport = HttpTransport::new(
        &config.api.base_url,
        &config.stream.content_path,
        config.api.token.clone(),
        config.stream.connect_timeout(),
    );
    info!(endpoint = transport.endpoint(), formation_id, "starting generation");
    let controller = SessionController::new(Arc::new(transport));
    let client = FormationClient::new(&config.api.base_url, config.api.token.clone());

    let phase = controller.subscribe_phase();
    let mut updates = controller.subscribe();
    controller.start(structure);

    let mut reporter = ProgressReporter::default();
    let reconcile = await_and_reconcile(phase, controller.subscribe(), &client, formation_id);
    tokio::pin!(reconcile);
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    let outcome = loop {
        tokio::select! {
            result = &mut reconcile => break Some(result?),
            Ok(()) = updates.changed() => {
                print_lines(reporter.observe(&updates.borrow_and_update()));
            }
            _ = &mut interrupt => {
                warn!("interrupted, stopping generation");
                controller.stop().await;
                break None;
            }
        }
    };
    print_lines(reporter.observe(&controller.progress()));

    match outcome {
        None => {
            eprintln!("generation stopped");
            Ok(false)
        }
        Some(Reconciled::Fetched(formation)) => {
            println!("{}", summary(&formation));
            Ok(true)
        }
        Some(Reconciled::Incomplete { error: Some(error) }) => {
            eprintln!("generation failed: {error}");
            Ok(false)
        }
        Some(Reconciled::Incomplete { error: None }) => {
            eprintln!("connection closed before the formation was completed");
            Ok(false)
        }
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn summary(formation: &Formation) -> String {
    format!(
        "{}: {}/{} lessons have content",
        formation.title,
        formation.lessons_with_content(),
        formation.lesson_count()
    )
}
