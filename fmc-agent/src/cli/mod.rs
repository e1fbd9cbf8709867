//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

use crate::config::AppConfig;
use crate::error::ValidationError;

/// Exit code for unexpected errors
pub const EXIT_FAILURE: u8 = 1;
/// Exit code when the workbook fails validation
pub const EXIT_VALIDATION: u8 = 2;

#[derive(Parser, Debug)]
#[command(
    name = "fmc-agent",
    version,
    about = "Validate FM&C workbooks and turn their rows into RV&S CLI operations"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); overrides the config file
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that a workbook has every required sheet, column and value
    Validate(FileArgs),
    /// Print the operations a run would execute, as JSON, without side effects
    Plan(PlanArgs),
    /// Execute operations and record them in the change log
    Run(RunArgs),
    /// Show the most recent change log entries
    Log(LogArgs),
    /// Summarise the known sheets of a workbook
    Sheets(FileArgs),
    /// Write a demonstration workbook
    Sample(SampleArgs),
}

#[derive(clap::Args, Debug)]
pub struct FileArgs {
    /// Path to the FM&C workbook (.xlsx)
    #[arg(long, short, value_name = "PATH")]
    pub file: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub workbook: FileArgs,

    /// Only these operations (repeatable); defaults to all
    #[arg(long = "ops", value_name = "NAME")]
    pub ops: Vec<String>,

    /// Write the plan to a file instead of stdout
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub workbook: FileArgs,

    /// Only these operations (repeatable); defaults to all
    #[arg(long = "ops", value_name = "NAME")]
    pub ops: Vec<String>,

    /// Run the commands for real; without it every command is simulated
    #[arg(long)]
    pub execute: bool,

    /// Simulate commands even when --execute is given
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args, Debug)]
pub struct LogArgs {
    #[command(flatten)]
    pub workbook: FileArgs,

    /// Number of entries to show
    #[arg(long, short = 'n', default_value_t = 10)]
    pub count: usize,
}

#[derive(clap::Args, Debug)]
pub struct SampleArgs {
    /// Where to write the workbook
    #[arg(long, short, value_name = "PATH", default_value = "fmc_sample.xlsx")]
    pub output: PathBuf,
}

/// Requested operation names, `None` meaning all
pub(crate) fn requested_ops(ops: &[String]) -> Option<&[String]> {
    if ops.is_empty() { None } else { Some(ops) }
}

/// Dispatch a parsed command
pub async fn run(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Validate(args) => commands::validate::handle_validate_command(args),
        Commands::Plan(args) => commands::plan::handle_plan_command(args, config),
        Commands::Run(args) => commands::run::handle_run_command(args, config).await,
        Commands::Log(args) => commands::log::handle_log_command(args, config),
        Commands::Sheets(args) => commands::sheets::handle_sheets_command(args),
        Commands::Sample(args) => commands::sample::handle_sample_command(args),
    }
}

/// Map a handler error to a process exit code
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if err.downcast_ref::<ValidationError>().is_some() {
        EXIT_VALIDATION
    } else {
        EXIT_FAILURE
    }
}

/// Print a handler error to stderr
pub fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<ValidationError>() {
        Some(validation) => {
            eprintln!(
                "{} {} issue(s) found",
                "Validation Error:".red().bold(),
                validation.issues.len()
            );
            for issue in &validation.issues {
                eprintln!("  {} {}", "-".red(), issue);
            }
        }
        None => eprintln!("{} {:#}", "Error:".red().bold(), err),
    }
}
