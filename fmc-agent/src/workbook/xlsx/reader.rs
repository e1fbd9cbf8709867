//! Read sheets from `.xlsx` files

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Xlsx, open_workbook};

use crate::workbook::{Row, Sheet};

/// Cells of one sheet exactly as stored, for rewriting
#[derive(Debug, Clone)]
pub(super) struct RawSheet {
    pub name: String,
    /// Absolute (row, col) of the first cell in `cells`
    pub origin: (u32, u32),
    pub cells: Vec<Vec<Data>>,
    /// Formulas keyed by absolute (row, col), without the leading `=`
    pub formulas: BTreeMap<(u32, u32), String>,
}

impl RawSheet {
    /// Cell at an absolute position, if inside the stored block
    pub fn cell(&self, row: u32, col: u32) -> Option<&Data> {
        let (row0, col0) = self.origin;
        let r = row.checked_sub(row0)? as usize;
        let c = col.checked_sub(col0)? as usize;
        self.cells.get(r)?.get(c)
    }
}

fn open(path: &Path) -> Result<Xlsx<BufReader<File>>> {
    open_workbook(path).with_context(|| format!("Failed to open Excel file: {}", path.display()))
}

fn load_range(workbook: &mut Xlsx<BufReader<File>>, name: &str) -> Result<Range<Data>> {
    workbook
        .worksheet_range(name)
        .with_context(|| format!("Failed to read sheet: {}", name))
}

pub(super) fn read_sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook = open(path)?;
    Ok(workbook.sheet_names().to_vec())
}

pub(super) fn read_sheet(path: &Path, name: &str) -> Result<Sheet> {
    let mut workbook = open(path)?;
    if !workbook.sheet_names().iter().any(|s| s == name) {
        anyhow::bail!("Sheet not found: {}", name);
    }

    let range = load_range(&mut workbook, name)?;
    let mut rows = range.rows();

    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(cell_to_string).collect(),
        None => return Ok(Sheet::new(name, Vec::new())),
    };

    let mut columns: Vec<String> = Vec::new();
    for h in &header {
        if !h.is_empty() && !columns.contains(h) {
            columns.push(h.clone());
        }
    }

    let data = rows
        .map(|cells| {
            let mut row = Row::new();
            for (col_idx, h) in header.iter().enumerate() {
                if h.is_empty() || row.contains_key(h) {
                    continue;
                }
                let value = cells.get(col_idx).map(cell_to_string).unwrap_or_default();
                row.insert(h.clone(), value);
            }
            row
        })
        .collect();

    Ok(Sheet {
        name: name.to_string(),
        columns,
        rows: data,
    })
}

/// Read every sheet with its typed cells
pub(super) fn read_raw_sheets(path: &Path) -> Result<Vec<RawSheet>> {
    let mut workbook = open(path)?;
    let names: Vec<String> = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = load_range(&mut workbook, &name)?;
        let origin = range.start().unwrap_or((0, 0));
        let cells = range.rows().map(|r| r.to_vec()).collect();
        let formulas = load_formulas(&mut workbook, &name)?;
        sheets.push(RawSheet {
            name,
            origin,
            cells,
            formulas,
        });
    }

    Ok(sheets)
}

fn load_formulas(
    workbook: &mut Xlsx<BufReader<File>>,
    name: &str,
) -> Result<BTreeMap<(u32, u32), String>> {
    let range = workbook
        .worksheet_formula(name)
        .with_context(|| format!("Failed to read formulas of sheet: {}", name))?;
    let (row0, col0) = range.start().unwrap_or((0, 0));

    Ok(range
        .used_cells()
        .filter(|(_, _, f)| !f.is_empty())
        .map(|(r, c, f)| ((row0 + r as u32, col0 + c as u32), f.clone()))
        .collect())
}

/// Render a cell as trimmed text
///
/// Whole floats drop their fractional part so ids typed as numbers read back as "1001".
pub(super) fn cell_to_string(cell: &Data) -> String {
    let text = match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    };
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_cell_uses_absolute_positions() {
        let sheet = RawSheet {
            name: "Create Causes".to_string(),
            origin: (1, 2),
            cells: vec![vec![Data::String("FM-001".to_string()), Data::Int(3)]],
            formulas: BTreeMap::new(),
        };

        assert_eq!(sheet.cell(1, 3), Some(&Data::Int(3)));
        assert_eq!(sheet.cell(0, 2), None);
        assert_eq!(sheet.cell(1, 9), None);
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("  F001 ".to_string())), "F001");
        assert_eq!(cell_to_string(&Data::Float(1001.0)), "1001");
        assert_eq!(cell_to_string(&Data::Float(0.25)), "0.25");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
    }
}
