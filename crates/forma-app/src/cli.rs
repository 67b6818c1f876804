use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Forma: generate and inspect AI-authored courses from the terminal.
#[derive(Parser, Debug)]
#[command(name = "forma", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error) or a full
    /// tracing filter directive.
    #[arg(long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream content generation for a formation, then fetch the result.
    Generate {
        /// Formation to reconcile against once generation completes.
        #[arg(long)]
        formation: String,
        /// JSON file holding the course structure to fill.
        #[arg(long)]
        structure: PathBuf,
    },
    /// Send one message to the course-design agent.
    Chat {
        text: String,
        /// Continue an existing conversation thread.
        #[arg(long)]
        thread: Option<String>,
    },
    /// Print a formation's modules and lessons.
    Show {
        id: String,
        /// Add a quiz lesson at the end of every module.
        #[arg(long)]
        with_quiz: bool,
    },
    /// List formations.
    List,
    /// Rename a module or lesson.
    Rename {
        #[arg(value_enum)]
        target: RenameTarget,
        /// Id as shown by `show` (`module_3`, `lesson_12` or `12`).
        id: String,
        title: String,
        /// New lesson description.
        #[arg(long)]
        description: Option<String>,
    },
    /// Print the effective configuration.
    Config,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RenameTarget {
    Module,
    Lesson,
}

pub fn parse() -> Args {
    Args::parse()
}
