//! Formation browsing and editing over the REST client.

use std::fmt::Write;

use forma_api::{
    filter_quiz_lessons, inject_quiz_lessons, is_quiz_lesson, FormationClient, LessonUpdate,
    ModuleUpdate,
};
use forma_common::{FormaError, Formation};
use forma_config::FormaConfig;
use tracing::{info, warn};

use crate::cli::RenameTarget;

fn client(config: &FormaConfig) -> FormationClient {
    FormationClient::new(&config.api.base_url, config.api.token.clone())
}

pub async fn show(config: &FormaConfig, id: &str, with_quiz: bool) -> Result<(), FormaError> {
    let formation = filter_quiz_lessons(client(config).get_formation(id).await?);
    let formation = if with_quiz {
        inject_quiz_lessons(formation)
    } else {
        formation
    };
    print!("{}", render_formation(&formation));
    Ok(())
}

pub async fn list(config: &FormaConfig) -> Result<(), FormaError> {
    let formations = client(config).list_formations().await?;
    if formations.is_empty() {
        println!("no formations");
    }
    for formation in formations {
        println!("{:>6}  {}", formation.id, formation.nom);
    }
    Ok(())
}

pub async fn rename(
    config: &FormaConfig,
    target: RenameTarget,
    id: &str,
    title: String,
    description: Option<String>,
) -> Result<(), FormaError> {
    let client = client(config);
    match target {
        RenameTarget::Module => {
            if description.is_some() {
                warn!("modules have no description, ignoring --description");
            }
            let update = ModuleUpdate {
                titre: Some(title),
                ..ModuleUpdate::default()
            };
            client.update_module(id, &update).await?;
        }
        RenameTarget::Lesson => {
            let update = LessonUpdate {
                titre: Some(title),
                description,
                ..LessonUpdate::default()
            };
            client.update_lesson(id, &update).await?;
        }
    }
    info!(id, ?target, "renamed");
    Ok(())
}

/// Indented outline of a formation, one line per module and lesson.
pub fn render_formation(formation: &Formation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", formation.title);
    for module in &formation.modules {
        let _ = writeln!(out, "  [{}] {}", module.id, module.title);
        for lesson in &module.lessons {
            let marker = if is_quiz_lesson(lesson) {
                " (quiz)"
            } else if !has_text(lesson.content.as_deref()) {
                " (empty)"
            } else {
                ""
            };
            let _ = writeln!(out, "    - [{}] {}{marker}", lesson.id, lesson.title);
        }
    }
    out
}

fn has_text(content: Option<&str>) -> bool {
    content.is_some_and(|c| !c.trim().is_empty())
}
