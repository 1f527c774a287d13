use bcopilot::cli::{Cli, Commands};
use bcopilot::commands::{self, GenerateOptions};
use bcopilot::config::Config;
use bcopilot::error::Result;
use bcopilot::registry::{CredentialStore, Registry, YamlFileStore};
use clap::{CommandFactory, Parser};
use colored::*;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // 쿼리도 서브커맨드도 없으면 도움말 출력 후 실패
    if cli.command.is_none() && cli.query_text().trim().is_empty() {
        let mut cmd = Cli::command();
        eprintln!("{}", cmd.render_help());
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e.to_string().red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    tracing::debug!(dir = %config.dir.display(), "using config directory");

    let mut registry = Registry::load(
        Box::new(YamlFileStore::new(config.registry_path())),
        CredentialStore::new(&config.dir),
    )?;

    let query = cli.query_text();
    let purpose = cli.purpose();

    match cli.command {
        Some(Commands::Config { action }) => commands::config::execute(&mut registry, action),
        None => {
            let options = GenerateOptions {
                query,
                purpose,
                files: cli.files,
                assume_yes: cli.yes,
            };
            commands::execute_generate(&config, &registry, options).await
        }
    }
}

/// stderr로 로그 출력. RUST_LOG가 있으면 우선, 없으면 --debug 여부로 결정
fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
