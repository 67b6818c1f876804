mod cli;
mod commands;
mod reporter;

use std::process::ExitCode;

use forma_common::{CredentialSink, FormaError, TracingCredentialSink};
use forma_config::FormaConfig;
use tracing_subscriber::EnvFilter;

use cli::Command;

const DEFAULT_LOG_DIRECTIVE: &str = "forma=info";

/// Load environment variables from a .env file (KEY=VALUE lines).
fn load_dotenv() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidates = [
        // Current directory
        std::path::PathBuf::from(".env"),
        // Workspace root, two levels up from crates/forma-app/
        manifest_dir.join("..").join("..").join(".env"),
    ];

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for (key, value) in parse_dotenv(&contents) {
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
            return;
        }
    }
}

fn parse_dotenv(contents: &str) -> Vec<(&str, &str)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            (
                key.trim(),
                value.trim().trim_matches('"').trim_matches('\''),
            )
        })
        .collect()
}

fn log_filter(directive: &str) -> EnvFilter {
    let directive = directive.parse().unwrap_or_else(|_| {
        DEFAULT_LOG_DIRECTIVE
            .parse()
            .expect("default log directive is valid")
    });
    EnvFilter::from_default_env().add_directive(directive)
}

fn load_config(args: &cli::Args) -> Result<FormaConfig, FormaError> {
    match &args.config {
        Some(path) => Ok(forma_config::load_config_from(path)?),
        None => Ok(forma_config::load_config()?),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file before anything else
    load_dotenv();

    let args = cli::parse();

    // Logging is configured from the config file, so load it first and
    // report a failure once the subscriber is up.
    let loaded = load_config(&args);
    let directive = args.log_level.clone().unwrap_or_else(|| match &loaded {
        Ok(config) => config.logging.level.directive(),
        Err(_) => DEFAULT_LOG_DIRECTIVE.to_string(),
    });
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&directive))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Forma v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => config,
        Err(e) if args.config.is_some() => {
            tracing::error!("Config load failed: {e}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            tracing::warn!("Config load failed, using defaults: {e}");
            let mut config = FormaConfig::default();
            forma_config::apply_env_overrides(&mut config);
            config
        }
    };

    if config.api.has_token() {
        TracingCredentialSink.token_available(&config.api.token);
    } else if !matches!(args.command, Command::Config) {
        tracing::warn!(
            "No bearer token configured; set {} or api.token",
            forma_config::ENV_TOKEN
        );
    }

    match run(args.command, &config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: &FormaConfig) -> Result<bool, FormaError> {
    match command {
        Command::Generate {
            formation,
            structure,
        } => commands::generate(config, &formation, &structure).await,
        Command::Chat { text, thread } => commands::chat(config, &text, thread).await,
        Command::Show { id, with_quiz } => {
            commands::show(config, &id, with_quiz).await?;
            Ok(true)
        }
        Command::List => {
            commands::list(config).await?;
            Ok(true)
        }
        Command::Rename {
            target,
            id,
            title,
            description,
        } => {
            commands::rename(config, target, &id, title, description).await?;
            Ok(true)
        }
        Command::Config => {
            println!("{}", forma_config::config_to_json(config));
            Ok(true)
        }
    }
}
