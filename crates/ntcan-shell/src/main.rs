//! NTCAN shell: run `ntcan::` commands from `-c`, a script, or stdin.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use ntcan_commands::CommandRegistry;
use ntcan_shell::config::{Backend, ShellConfig};
use ntcan_shell::session::{self, Session, Source};

#[derive(Parser, Debug)]
#[command(name = "ntcan-shell", version, about = "Run NTCAN commands")]
struct Cli {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Driver backend (overrides the config file)
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Print one JSON object per command
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Command line to run; may be repeated
    #[arg(short = 'c', long = "command", value_name = "COMMAND")]
    commands: Vec<String>,

    /// Script with one command per line
    script: Option<PathBuf>,
}

impl Cli {
    fn source(&self) -> Source {
        if !self.commands.is_empty() {
            Source::Commands(self.commands.clone())
        } else if let Some(path) = &self.script {
            Source::Script(path.clone())
        } else {
            Source::Stdin
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // ── Load config ─────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => ShellConfig::from_file(path)?,
        None => ShellConfig::default(),
    };
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    config.json |= cli.json;

    // Logs go to stderr so stdout carries only command results.
    let filter = EnvFilter::from_default_env();
    if config.json || config.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = ?config.backend,
        "ntcan-shell starting"
    );

    // ── Build session ───────────────────────────────────────────
    let driver = config.build_driver()?;
    let registry = CommandRegistry::with_defaults();
    tracing::info!(command_count = registry.len(), "command registry initialized");
    let session = Arc::new(Session::new(registry, driver, config.json));

    let source = cli.source();
    let stop_on_error = config.stop_on_error && !source.is_interactive();
    let input = source.reader().await?;
    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();

    let summary = tokio::select! {
        result = session::run(session, input, &mut stdout, &mut stderr, stop_on_error) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            return Ok(ExitCode::from(130));
        }
    };

    tracing::info!(
        lines = summary.lines,
        failed = summary.failed,
        stopped = summary.stopped,
        "ntcan-shell finished"
    );
    Ok(if summary.stopped {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
