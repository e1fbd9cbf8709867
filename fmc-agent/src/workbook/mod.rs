//! Tabular data collaborator
//!
//! The engine never touches a file format directly. It reads named sheets through
//! [`WorkbookSource`] and appends audit rows through [`WorkbookStore`].
//!
//! Adapters:
//! - [`XlsxWorkbook`] - `.xlsx` files (calamine for reading, rust_xlsxwriter for rewriting)
//! - [`MemoryWorkbook`] - in-memory sheets, used by tests and the sample generator

mod memory;
pub mod sample;
mod xlsx;

use std::collections::BTreeMap;

use anyhow::Result;

pub use memory::MemoryWorkbook;
pub use xlsx::XlsxWorkbook;

/// One record of a sheet: column name -> cell text
pub type Row = BTreeMap<String, String>;

/// A sheet read from a workbook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    /// Sheet name
    pub name: String,
    /// Header row, in file order (blank headers dropped)
    pub columns: Vec<String>,
    /// Data rows, in file order; index 0 is spreadsheet row 2
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a sheet from positional records aligned with `columns`
    ///
    /// Missing trailing cells become empty strings.
    pub fn from_records(
        name: impl Into<String>,
        columns: &[&str],
        records: &[&[&str]],
    ) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| {
                        let value = record.get(i).copied().unwrap_or("");
                        (col.clone(), value.to_string())
                    })
                    .collect()
            })
            .collect();

        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Spreadsheet row number of a data row (header on row 1, rows 1-based)
pub fn display_row(index: usize) -> usize {
    index + 2
}

/// Read-only access to named sheets
pub trait WorkbookSource {
    /// Names of all sheets, in workbook order
    fn sheet_names(&self) -> Result<Vec<String>>;

    /// Read one sheet; fails if the sheet does not exist or cannot be decoded
    fn read_sheet(&self, name: &str) -> Result<Sheet>;
}

/// Append-only write access used by the change log
pub trait WorkbookStore: WorkbookSource {
    /// Append `rows` to `sheet`, creating the sheet with `header` first if it is absent
    ///
    /// Each row is positional and aligned with `header`. The change is persisted before
    /// returning.
    fn append_rows(&mut self, sheet: &str, header: &[&str], rows: &[Vec<String>]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_records_pads_missing_cells() {
        let sheet = Sheet::from_records(
            "Create Causes",
            &["Fail Mode ID", "Description", "Probability"],
            &[&["FM-001", "Coolant pump failure"]],
        );

        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0]["Fail Mode ID"], "FM-001");
        assert_eq!(sheet.rows[0]["Probability"], "");
        assert!(sheet.has_column("Description"));
        assert!(!sheet.has_column("Agent Status"));
    }

    #[test]
    fn test_display_row_accounts_for_header() {
        assert_eq!(display_row(0), 2);
        assert_eq!(display_row(1), 3);
    }
}
