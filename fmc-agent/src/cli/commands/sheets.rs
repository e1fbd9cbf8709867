//! `sheets` command

use anyhow::{Context, Result};
use colored::*;

use crate::cli::FileArgs;
use crate::schema::{SHEET_SCHEMAS, SheetSchema};
use crate::workbook::{WorkbookSource, XlsxWorkbook};

/// State of one known sheet in a workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetStatus {
    Present {
        rows: usize,
        columns: usize,
        missing_columns: Vec<String>,
    },
    Missing,
    Unreadable(String),
}

/// Status of every known sheet, in schema order
pub fn sheet_report<S>(source: &S) -> Result<Vec<(&'static SheetSchema, SheetStatus)>>
where
    S: WorkbookSource + ?Sized,
{
    let available = source.sheet_names().context("Failed to read workbook")?;

    Ok(SHEET_SCHEMAS
        .iter()
        .map(|schema| {
            let status = if !available.iter().any(|a| a == schema.sheet) {
                SheetStatus::Missing
            } else {
                match source.read_sheet(schema.sheet) {
                    Ok(sheet) => SheetStatus::Present {
                        rows: sheet.rows.len(),
                        columns: sheet.columns.len(),
                        missing_columns: schema
                            .required_columns
                            .iter()
                            .filter(|c| !sheet.has_column(c))
                            .map(|c| c.to_string())
                            .collect(),
                    },
                    Err(e) => SheetStatus::Unreadable(format!("{:#}", e)),
                }
            };
            (schema, status)
        })
        .collect())
}

pub fn handle_sheets_command(args: FileArgs) -> Result<()> {
    let workbook = XlsxWorkbook::new(&args.file);

    for (schema, status) in sheet_report(&workbook)? {
        match status {
            SheetStatus::Present {
                rows,
                columns,
                missing_columns,
            } => {
                println!(
                    "{} {} ({} rows, {} columns)",
                    "present".green(),
                    schema.sheet,
                    rows,
                    columns
                );
                if !missing_columns.is_empty() {
                    println!(
                        "    {} {}",
                        "missing columns:".yellow(),
                        missing_columns.join(", ")
                    );
                }
            }
            SheetStatus::Missing => println!("{} {}", "missing".red(), schema.sheet),
            SheetStatus::Unreadable(e) => println!("{} {}: {}", "error".red(), schema.sheet, e),
        }
    }

    Ok(())
}
