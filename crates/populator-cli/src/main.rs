mod config;
mod logging;
mod progress;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use populator_core::{Depth, Error as CoreError, validate_base_path, validate_run_config};
use populator_generate::{GenerateOptions, GenerationError, Orchestrator};
use thiserror::Error;
use uuid::Uuid;

use config::{FileConfig, Overrides, RunSettings, load_file_config};
use report::{RunReport, format_platform_info, format_preview, format_summary, write_report};

#[derive(Debug, Error)]
enum CliError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Parser, Debug)]
#[command(
    name = "populator",
    version,
    about = "Generate realistic business file trees with sample data"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create COUNT files under PATH.
    Generate(GenerateArgs),
    /// Show platform details that affect file naming.
    PlatformInfo,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Output directory for generated files.
    #[arg(value_name = "PATH")]
    path: PathBuf,
    /// Number of files to generate (1-10000).
    #[arg(value_name = "COUNT")]
    count: usize,
    /// Directory depth: 1 flat, 2 with sub-directories, 3 with year folders. Default: 2.
    #[arg(short, long)]
    depth: Option<u8>,
    /// Maximum concurrent file generation tasks. Default: 10.
    #[arg(short, long)]
    concurrency: Option<usize>,
    /// Seed for reproducible output.
    #[arg(short, long)]
    seed: Option<u64>,
    /// Print the planned structure without creating files.
    #[arg(short, long, default_value_t = false)]
    preview: bool,
    /// Suppress progress and summary output.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
    /// Force Windows-compatible file names (automatic on Windows).
    #[arg(short, long, default_value_t = false)]
    windows: bool,
    /// Keep the filesystem's own timestamps instead of back-dating files.
    #[arg(long, default_value_t = false)]
    no_timestamps: bool,
    /// TOML file with defaults for depth, concurrency, seed, windows and timestamps.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Write the run result as JSON.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
    /// Log engine events at info level.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
    /// Append JSON log lines to this file.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// What a command achieved, mapped onto the process exit code.
enum Outcome {
    Clean,
    PartialFailure,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::PlatformInfo => {
            print!("{}", format_platform_info());
            Ok(Outcome::Clean)
        }
    };

    match outcome {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::PartialFailure) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(2)
        }
    }
}

async fn run_generate(args: GenerateArgs) -> Result<Outcome, CliError> {
    logging::init_logging(args.verbose, args.log_file.as_deref())?;

    let file_config = match &args.config {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };
    let overrides = Overrides {
        depth: args.depth,
        concurrency: args.concurrency,
        seed: args.seed,
        windows: args.windows,
        no_timestamps: args.no_timestamps,
    };
    let settings = RunSettings::merge(&overrides, &file_config);

    let run_config = validate_run_config(args.count, settings.depth, settings.concurrency)?;
    let base = absolute_path(&args.path)?;
    validate_base_path(&base)?;

    let options = GenerateOptions {
        concurrency: run_config.concurrency,
        seed: settings.seed,
        sanitize: settings.sanitize,
        realistic_timestamps: settings.timestamps,
        ..GenerateOptions::default()
    };
    let orchestrator = Orchestrator::new(options);

    if args.preview {
        return run_preview(&orchestrator, &base, run_config.depth, args.count, args.quiet);
    }

    let run_id = Uuid::new_v4();
    tracing::info!(event = "run_started", run_id = %run_id, base = %base.display());

    if !args.quiet {
        print_banner(&base, args.count, &settings);
    }

    let progress = (!args.quiet).then(progress::stderr_progress);
    let result = orchestrator
        .run(&base, args.count, run_config.depth, progress)
        .await?;

    if !args.quiet {
        println!();
        print!("{}", format_summary(&result));
    }

    if let Some(path) = &args.report {
        let report = RunReport::new(run_id, &base, settings.depth, &result);
        write_report(path, &report)?;
        tracing::info!(event = "report_written", path = %path.display());
    }

    tracing::info!(
        event = "run_finished",
        run_id = %run_id,
        successful = result.successful,
        failed = result.failed
    );

    if result.has_failures() {
        Ok(Outcome::PartialFailure)
    } else {
        Ok(Outcome::Clean)
    }
}

fn run_preview(
    orchestrator: &Orchestrator,
    base: &Path,
    depth: Depth,
    count: usize,
    quiet: bool,
) -> Result<Outcome, CliError> {
    if !quiet {
        println!("Preview of structure for {count} files in {}:", base.display());
        println!();
    }
    let preview = orchestrator.preview(base, count, depth)?;
    print!("{}", format_preview(&preview));
    Ok(Outcome::Clean)
}

fn print_banner(base: &Path, count: usize, settings: &RunSettings) {
    println!("Generating {count} files in {}", base.display());
    println!("Depth: {}, Concurrency: {}", settings.depth, settings.concurrency);
    if let Some(seed) = settings.seed {
        println!("Seed: {seed}");
    }
    if settings.sanitize.is_active() {
        println!("Windows filename sanitization: enabled");
    }
    if settings.timestamps {
        println!("Realistic timestamps: enabled");
    }
    println!();
}

fn absolute_path(path: &Path) -> Result<PathBuf, CliError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}
