//! Argument parsing, bootstrap and command dispatch.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use vidcut_config::{ConflictPolicy, TrimConfig};
use vidcut_events::EventBus;
use vidcut_media::FfmpegProvider;
use vidcut_telemetry::{LogFormat, LoggingConfig, Metrics, build_sha, init_logging};
use vidcut_trim::{TrimOptions, TrimService};

use crate::commands::{cut, plan};
use crate::error::{CliError, CliResult};

pub(crate) type Service = TrimService<FfmpegProvider>;

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(exit_code) => exit_code,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<i32> {
    let mut config = TrimConfig::load(cli.config.as_deref())?;
    if let Command::Cut(args) = &cli.command
        && let Some(policy) = args.on_conflict
    {
        config.on_conflict = policy;
    }
    install_logging(&config)?;
    debug!(build_sha = build_sha(), command = cli.command.label(), "vidcut starting");

    let service = Arc::new(build_service(&config)?);
    match cli.command {
        Command::Cut(args) => cut::handle(service, args, cli.output).await,
        Command::Plan(args) => plan::handle(&service, args, cli.output).await,
    }
}

fn install_logging(config: &TrimConfig) -> CliResult<()> {
    let format = match config.log_format.as_deref() {
        Some(label) => LogFormat::from_str(label)
            .map_err(|value| CliError::validation(format!("unknown log format {value:?}")))?,
        None => LogFormat::infer(),
    };
    init_logging(&LoggingConfig {
        level: &config.log_level,
        format,
        ..LoggingConfig::default()
    })
    .map_err(|err| CliError::failure(anyhow!("failed to initialise logging: {err}")))
}

fn build_service(config: &TrimConfig) -> CliResult<Service> {
    let metrics =
        Metrics::new().map_err(|err| CliError::failure(anyhow!("failed to build metrics: {err}")))?;
    let service = TrimService::new(
        FfmpegProvider::from_config(config),
        TrimOptions::from_config(config),
        EventBus::new(),
        metrics,
    )?;
    Ok(service)
}

#[derive(Parser, Debug)]
#[command(
    name = "vidcut",
    version,
    about = "Keep only the final seconds of video files"
)]
pub(crate) struct Cli {
    /// JSON configuration file; environment variables override its values.
    #[arg(long, global = true, env = "VIDCUT_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Output format for the summary.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Trim each file to its final seconds, writing a prefixed copy beside it.
    Cut(CutArgs),
    /// Probe each file and show what `cut` would do without writing anything.
    Plan(PlanArgs),
}

impl Command {
    const fn label(&self) -> &'static str {
        match self {
            Self::Cut(_) => "cut",
            Self::Plan(_) => "plan",
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct CutArgs {
    /// Seconds to keep from the end of each file.
    #[arg(long, short = 'k', value_name = "SECONDS")]
    pub(crate) keep: String,
    /// Remove each original after its trimmed copy has been written.
    #[arg(long)]
    pub(crate) delete_originals: bool,
    /// Skip the confirmation prompt for `--delete-originals`.
    #[arg(long, short = 'y')]
    pub(crate) yes: bool,
    /// What to do when the output file already exists.
    #[arg(long, value_name = "POLICY", value_parser = ConflictPolicy::from_str)]
    pub(crate) on_conflict: Option<ConflictPolicy>,
    /// Video files to trim, processed in the order given.
    #[arg(value_name = "FILES")]
    pub(crate) files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    /// Seconds to keep from the end of each file.
    #[arg(long, short = 'k', value_name = "SECONDS")]
    pub(crate) keep: String,
    /// Video files to inspect.
    #[arg(value_name = "FILES")]
    pub(crate) files: Vec<PathBuf>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}
