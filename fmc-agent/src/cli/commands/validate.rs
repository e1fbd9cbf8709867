//! `validate` command

use anyhow::{Context, Result};
use colored::*;

use crate::cli::FileArgs;
use crate::operations::OperationRegistry;
use crate::validation::validate_workbook;
use crate::workbook::XlsxWorkbook;

pub fn handle_validate_command(args: FileArgs) -> Result<()> {
    let workbook = XlsxWorkbook::new(&args.file);
    let registry = OperationRegistry::builtin();

    validate_workbook(&workbook, &registry)
        .with_context(|| format!("Workbook {} is not valid", args.file.display()))?;

    println!("{} {}", "Workbook is valid".green().bold(), args.file.display());
    Ok(())
}
