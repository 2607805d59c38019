//! stepwise: idempotent provisioning step runner.
//!
//! Reads a TOML run file, registers its steps, and runs the selected ones in
//! order, skipping anything already in the desired state.
//!
//! Usage:
//!   stepwise --config devsetup.toml run
//!   stepwise --config devsetup.toml run --skip wsl --best-effort
//!   stepwise --config devsetup.toml plan
//!   stepwise --config devsetup.toml steps

mod orchestrator;

use std::path::PathBuf;

use clap::{builder::BoolishValueParser, Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use stepwise_config::Overrides;
use stepwise_contracts::{error::StepwiseResult, run::RunReport};
use stepwise_core::report::render_summary;

use orchestrator::{write_report_json, Orchestrator};

/// Exit code for failures before any step runs.
const STARTUP_FAILURE: i32 = 2;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "stepwise",
    version,
    about = "Idempotent, fallback-aware provisioning step runner",
    long_about = "Runs the steps of a TOML run file in order. Steps whose desired state\n\
                  already holds are skipped; optional step failures become warnings."
)]
struct Cli {
    /// Run file to load.
    #[arg(short, long, global = true, env = "STEPWISE_CONFIG", default_value = "stepwise.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Provision: run every selected step.
    Run(RunArgs),
    /// Evaluate preconditions only and show what a run would do.
    Plan(SelectArgs),
    /// List the configured steps.
    Steps,
}

#[derive(Args, Default)]
struct SelectArgs {
    /// Run only these step names or tags.
    #[arg(long, value_delimiter = ',')]
    only: Vec<String>,
    /// Leave out these step names or tags.
    #[arg(long, value_delimiter = ',')]
    skip: Vec<String>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    select: SelectArgs,
    /// Apply these steps even when already satisfied.
    #[arg(long, value_delimiter = ',')]
    force: Vec<String>,
    /// Log file tried before the configured candidates.
    #[arg(long, env = "STEPWISE_LOG_PATH")]
    log_path: Option<String>,
    /// Keep going after a required step fails.
    #[arg(long, env = "STEPWISE_BEST_EFFORT", value_parser = BoolishValueParser::new())]
    best_effort: bool,
    /// Extra attempts for a failing action.
    #[arg(long)]
    retries: Option<u32>,
    /// Delay between attempts, in milliseconds.
    #[arg(long)]
    retry_delay_ms: Option<u64>,
    /// Check preconditions and log, but never apply.
    #[arg(long)]
    dry_run: bool,
    /// Also write the run report as JSON.
    #[arg(long)]
    report_json: Option<PathBuf>,
}

impl SelectArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            only: self.only.clone(),
            skip: self.skip.clone(),
            ..Overrides::default()
        }
    }
}

impl RunArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            log_paths: self.log_path.iter().cloned().collect(),
            force: self.force.clone(),
            best_effort: self.best_effort,
            retries: self.retries,
            retry_delay_ms: self.retry_delay_ms,
            ..self.select.overrides()
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // RUST_LOG=debug shows collaborator commands and digests.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let code = match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("stepwise: {}", e);
            STARTUP_FAILURE
        }
    };
    std::process::exit(code);
}

fn execute(cli: Cli) -> StepwiseResult<i32> {
    match cli.command {
        Command::Run(args) => {
            let orchestrator = Orchestrator::load(&cli.config, &args.overrides())?;
            let report = orchestrator.run(args.dry_run)?;
            finish(&report, args.report_json.as_deref());
            Ok(report.exit_code())
        }
        Command::Plan(args) => {
            let orchestrator = Orchestrator::load(&cli.config, &args.overrides())?;
            let report = orchestrator.plan();
            finish(&report, None);
            Ok(report.exit_code())
        }
        Command::Steps => {
            let orchestrator = Orchestrator::load(&cli.config, &Overrides::default())?;
            print_steps(&orchestrator);
            Ok(0)
        }
    }
}

/// Print the summary; a report write failure never changes the exit code.
fn finish(report: &RunReport, report_json: Option<&std::path::Path>) {
    println!();
    println!("{}", render_summary(report));

    if let Some(path) = report_json {
        if let Err(e) = write_report_json(report, path) {
            warn!(path = %path.display(), error = %e, "run report not written");
        }
    }
}

fn print_steps(orchestrator: &Orchestrator) {
    let steps = &orchestrator.config().steps;
    let width = steps.iter().map(|s| s.name.len()).max().unwrap_or(4).max(4);

    println!("{:<width$}  {:<8}  {:<15}  {}", "STEP", "REQUIRED", "KIND", "TAGS", width = width);
    for step in steps {
        println!(
            "{:<width$}  {:<8}  {:<15}  {}",
            step.name,
            if step.required { "yes" } else { "no" },
            step.action.label(),
            step.tags.join(","),
            width = width
        );
    }
}
