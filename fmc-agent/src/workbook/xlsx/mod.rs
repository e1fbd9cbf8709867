//! `.xlsx` adapter
//!
//! Reading goes through calamine. Appending rewrites the whole file with rust_xlsxwriter:
//! cell values (strings, numbers, booleans, dates) and formulas survive, styling does not. The
//! first rewrite through a given [`XlsxWorkbook`] is preceded by a timestamped copy of the file.

mod reader;
mod writer;

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{Sheet, WorkbookSource, WorkbookStore};

/// Workbook backed by an `.xlsx` file on disk
///
/// Every call opens the file afresh; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct XlsxWorkbook {
    path: PathBuf,
    backup: Option<PathBuf>,
}

impl XlsxWorkbook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: None,
        }
    }

    /// Copy the file to `<stem>_backup_<timestamp>.xlsx` unless this handle already did
    pub fn ensure_backup(&mut self) -> Result<&Path> {
        let backup = match self.backup.take() {
            Some(existing) => existing,
            None => {
                let created = writer::backup(&self.path)?;
                log::info!(
                    "Backed up {} to {}",
                    self.path.display(),
                    created.display()
                );
                created
            }
        };
        Ok(self.backup.insert(backup).as_path())
    }

    /// Write `sheets` as a brand new workbook, replacing any existing file
    pub fn create(path: impl Into<PathBuf>, sheets: &[Sheet]) -> Result<Self> {
        let workbook = Self::new(path);
        writer::write_sheets(&workbook.path, sheets)?;
        Ok(workbook)
    }
}

impl WorkbookSource for XlsxWorkbook {
    fn sheet_names(&self) -> Result<Vec<String>> {
        reader::read_sheet_names(&self.path)
    }

    fn read_sheet(&self, name: &str) -> Result<Sheet> {
        reader::read_sheet(&self.path, name)
    }
}

impl WorkbookStore for XlsxWorkbook {
    fn append_rows(&mut self, sheet: &str, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
        self.ensure_backup()?;
        writer::append_rows(&self.path, sheet, header, rows)
    }
}
