//! In-memory workbook

use anyhow::{Result, bail};

use super::{Row, Sheet, WorkbookSource, WorkbookStore};

/// Sheets held in memory, in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<Sheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet, replacing any sheet with the same name
    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.insert(sheet);
        self
    }

    pub fn insert(&mut self, sheet: Sheet) {
        match self.sheets.iter_mut().find(|s| s.name == sheet.name) {
            Some(existing) => *existing = sheet,
            None => self.sheets.push(sheet),
        }
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Result<Vec<String>> {
        Ok(self.sheets.iter().map(|s| s.name.clone()).collect())
    }

    fn read_sheet(&self, name: &str) -> Result<Sheet> {
        match self.sheet(name) {
            Some(sheet) => Ok(sheet.clone()),
            None => bail!("Sheet not found: {}", name),
        }
    }
}

impl WorkbookStore for MemoryWorkbook {
    fn append_rows(&mut self, sheet: &str, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
        if self.sheet(sheet).is_none() {
            self.sheets.push(Sheet::new(
                sheet,
                header.iter().map(|h| h.to_string()).collect(),
            ));
        }

        let target = self
            .sheets
            .iter_mut()
            .find(|s| s.name == sheet)
            .ok_or_else(|| anyhow::anyhow!("Sheet not found: {}", sheet))?;

        if let Some(missing) = header.iter().find(|h| !target.has_column(h)) {
            bail!("Sheet '{}' has no '{}' column", sheet, missing);
        }

        for values in rows {
            let mut row: Row = target
                .columns
                .iter()
                .map(|col| (col.clone(), String::new()))
                .collect();
            for (col, value) in header.iter().zip(values) {
                row.insert(col.to_string(), value.clone());
            }
            target.rows.push(row);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_creates_sheet_with_header() {
        let mut workbook = MemoryWorkbook::new();
        workbook
            .append_rows("Audit", &["A", "B"], &[vec!["1".into(), "2".into()]])
            .unwrap();

        let sheet = workbook.read_sheet("Audit").unwrap();
        assert_eq!(sheet.columns, vec!["A", "B"]);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0]["B"], "2");
    }

    #[test]
    fn test_append_extends_existing_sheet() {
        let mut workbook =
            MemoryWorkbook::new().with_sheet(Sheet::from_records("Audit", &["A"], &[&["first"]]));
        workbook
            .append_rows("Audit", &["A"], &[vec!["second".into()]])
            .unwrap();

        let sheet = workbook.read_sheet("Audit").unwrap();
        let values: Vec<&str> = sheet.rows.iter().map(|r| r["A"].as_str()).collect();
        assert_eq!(values, vec!["first", "second"]);
    }

    #[test]
    fn test_missing_sheet_is_an_error() {
        let workbook = MemoryWorkbook::new();
        assert!(workbook.read_sheet("Nope").is_err());
    }
}
