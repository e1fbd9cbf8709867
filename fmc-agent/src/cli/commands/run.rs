//! `run` command

use anyhow::{Context, Result};
use colored::*;

use crate::change_log::ChangeLog;
use crate::cli::{RunArgs, requested_ops};
use crate::config::AppConfig;
use crate::operations::executor::CommandRunner;
use crate::operations::{
    CommandExecutor, ExecutionMode, Operation, OperationParser, OperationRegistry, ShellRunner,
};
use crate::validation::validate_workbook;
use crate::workbook::{WorkbookStore, XlsxWorkbook};

/// Totals of one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Entries that could not be written to the change log
    pub unlogged: usize,
}

/// Execute operations strictly in order, recording each one
pub async fn execute_operations<S: WorkbookStore>(
    operations: &[Operation],
    executor: &CommandExecutor,
    change_log: &mut ChangeLog<S>,
) -> RunSummary {
    let mut summary = RunSummary::default();

    for operation in operations {
        let result = executor.execute(operation).await;

        let id = result.extracted_id.as_deref().unwrap_or("-");
        if result.success {
            summary.succeeded += 1;
            println!(
                "Row {}: {} -> {} (ID: {})",
                operation.row_number,
                operation.operation_type,
                "Success".green(),
                id
            );
        } else {
            summary.failed += 1;
            println!(
                "Row {}: {} -> {} {}",
                operation.row_number,
                operation.operation_type,
                "Failed".red(),
                result.output.trim().dimmed()
            );
        }

        if !change_log.append_entry(
            operation,
            result.success,
            &result.output,
            result.extracted_id.as_deref(),
        ) {
            summary.unlogged += 1;
        }
    }

    summary
}

/// Commands run for real only with `--execute`, and never when a dry run is requested
pub fn execution_mode(args: &RunArgs, config: &AppConfig) -> ExecutionMode {
    if args.execute && !args.dry_run && !config.dry_run {
        ExecutionMode::Execute
    } else {
        ExecutionMode::Simulate
    }
}

pub async fn handle_run_command(args: RunArgs, config: &AppConfig) -> Result<()> {
    let runner = ShellRunner::new(config.rvs_server.clone());
    run_workbook(args, config, Box::new(runner)).await
}

async fn run_workbook(
    args: RunArgs,
    config: &AppConfig,
    runner: Box<dyn CommandRunner>,
) -> Result<()> {
    let mut workbook = XlsxWorkbook::new(&args.workbook.file);
    let registry = OperationRegistry::builtin();

    validate_workbook(&workbook, &registry).context("Workbook validation failed")?;

    let parsed =
        OperationParser::new(&workbook, &registry).parse_operations(requested_ops(&args.ops));
    for name in &parsed.unknown {
        println!("{} No operation named '{}'", "Warning:".yellow(), name);
    }
    for rejected in &parsed.rejected {
        println!(
            "{} {} row {}: {}",
            "Skipped".yellow(),
            rejected.sheet,
            rejected.row,
            rejected.error
        );
    }

    let mode = execution_mode(&args, config);
    if mode == ExecutionMode::Simulate {
        println!(
            "{}",
            "Dry run: commands are simulated (pass --execute to run them)".yellow()
        );
    }

    if !parsed.operations.is_empty() {
        let backup = workbook.ensure_backup()?;
        println!("{} {}", "Backup:".dimmed(), backup.display());
    }

    let executor = CommandExecutor::new(mode, runner).with_timeout(config.command_timeout());
    let mut change_log = ChangeLog::new(workbook).with_max_output_len(config.max_output_len);

    let summary = execute_operations(&parsed.operations, &executor, &mut change_log).await;

    println!();
    println!(
        "{} succeeded, {} failed, {} skipped",
        summary.succeeded.to_string().green(),
        summary.failed.to_string().red(),
        parsed.rejected.len()
    );
    if summary.unlogged > 0 {
        println!(
            "{} {} change log entries could not be written",
            "Warning:".yellow(),
            summary.unlogged
        );
    }

    Ok(())
}
