//! `log` command

use anyhow::Result;
use colored::*;

use crate::change_log::ChangeLog;
use crate::cli::LogArgs;
use crate::config::AppConfig;
use crate::workbook::{Row, XlsxWorkbook};

fn field<'a>(row: &'a Row, column: &str) -> &'a str {
    row.get(column).map(String::as_str).unwrap_or("")
}

pub fn handle_log_command(args: LogArgs, config: &AppConfig) -> Result<()> {
    if !args.workbook.file.exists() {
        anyhow::bail!("Workbook does not exist: {}", args.workbook.file.display());
    }

    let change_log = ChangeLog::new(XlsxWorkbook::new(&args.workbook.file))
        .with_max_output_len(config.max_output_len);
    let entries = change_log.get_recent_entries(args.count);

    if entries.is_empty() {
        println!("No change log entries");
        return Ok(());
    }

    for entry in &entries {
        let status = match field(entry, "Status") {
            "Success" => "Success".green(),
            "Failed" => "Failed".red(),
            other => other.normal(),
        };
        println!(
            "{}  {}  {}  {}",
            field(entry, "Timestamp").dimmed(),
            field(entry, "Operation"),
            status,
            field(entry, "Details")
        );
    }

    Ok(())
}
