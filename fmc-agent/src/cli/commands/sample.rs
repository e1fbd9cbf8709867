//! `sample` command

use anyhow::{Context, Result};
use colored::*;

use crate::cli::SampleArgs;
use crate::workbook::sample::write_sample_workbook;

pub fn handle_sample_command(args: SampleArgs) -> Result<()> {
    if args.output.exists() {
        anyhow::bail!("Refusing to overwrite existing file: {}", args.output.display());
    }

    write_sample_workbook(&args.output).with_context(|| {
        format!("Failed to write sample workbook: {}", args.output.display())
    })?;

    println!(
        "Sample workbook written to {}",
        args.output.display().to_string().bright_green()
    );
    Ok(())
}
