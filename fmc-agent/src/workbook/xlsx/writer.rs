//! Write `.xlsx` files

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calamine::Data;
use chrono::Local;
use rust_xlsxwriter::{Format, Formula, Workbook, Worksheet};

use super::reader::{self, RawSheet, cell_to_string};
use crate::workbook::Sheet;

const DATE_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Write plain-text sheets as a new workbook
pub(super) fn write_sheets(path: &Path, sheets: &[Sheet]) -> Result<()> {
    let raw: Vec<RawSheet> = sheets.iter().map(sheet_to_raw).collect();
    save(path, &raw)
}

/// Append rows to `sheet`, creating it with `header` if needed, then persist
pub(super) fn append_rows(
    path: &Path,
    sheet: &str,
    header: &[&str],
    rows: &[Vec<String>],
) -> Result<()> {
    let mut sheets = reader::read_raw_sheets(path)?;

    match sheets.iter_mut().find(|s| s.name == sheet) {
        Some(existing) => append_aligned(existing, header, rows)?,
        None => {
            let mut cells = vec![header.iter().map(|h| text(h)).collect::<Vec<_>>()];
            cells.extend(rows.iter().map(|r| r.iter().map(|v| text(v)).collect()));
            sheets.push(RawSheet {
                name: sheet.to_string(),
                origin: (0, 0),
                cells,
                formulas: BTreeMap::new(),
            });
        }
    }

    save(path, &sheets)
}

/// Append after the last populated row, matching values to the existing header by name
fn append_aligned(existing: &mut RawSheet, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    if existing.cells.is_empty() {
        existing.origin = (0, 0);
        existing.cells.push(header.iter().map(|h| text(h)).collect());
    }

    let existing_header: Vec<String> = existing.cells[0].iter().map(cell_to_string).collect();
    let positions = header
        .iter()
        .map(|h| {
            existing_header
                .iter()
                .position(|e| e == h)
                .with_context(|| format!("Sheet '{}' has no '{}' column", existing.name, h))
        })
        .collect::<Result<Vec<usize>>>()?;

    let width = existing_header.len();
    for values in rows {
        let mut cells = vec![Data::Empty; width];
        for (value, &col) in values.iter().zip(&positions) {
            cells[col] = text(value);
        }
        existing.cells.push(cells);
    }

    Ok(())
}

fn sheet_to_raw(sheet: &Sheet) -> RawSheet {
    let mut cells = vec![sheet.columns.iter().map(|c| text(c)).collect::<Vec<_>>()];
    for row in &sheet.rows {
        cells.push(
            sheet
                .columns
                .iter()
                .map(|c| text(row.get(c).map(String::as_str).unwrap_or("")))
                .collect(),
        );
    }

    RawSheet {
        name: sheet.name.clone(),
        origin: (0, 0),
        cells,
        formulas: BTreeMap::new(),
    }
}

fn text(value: &str) -> Data {
    if value.is_empty() {
        Data::Empty
    } else {
        Data::String(value.to_string())
    }
}

/// Write to a sibling temporary file, then rename over the target
fn save(path: &Path, sheets: &[RawSheet]) -> Result<()> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format(DATE_FORMAT);

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .with_context(|| format!("Invalid sheet name: {}", sheet.name))?;

        let (row0, col0) = sheet.origin;
        for (r, cells) in sheet.cells.iter().enumerate() {
            for (c, cell) in cells.iter().enumerate() {
                let row = row0 + r as u32;
                let col = (col0 as usize + c) as u16;
                write_cell(worksheet, row, col, cell, &date_format)?;
            }
        }

        for (&(row, col), formula) in &sheet.formulas {
            let cached = sheet.cell(row, col).map(cell_to_string).unwrap_or_default();
            worksheet.write_formula(row, col as u16, Formula::new(formula).set_result(cached))?;
        }
    }

    let tmp = temp_path(path);
    workbook
        .save(&tmp)
        .with_context(|| format!("Failed to save Excel file: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace Excel file: {}", path.display()))?;

    Ok(())
}

/// Copy `path` to a timestamped sibling, never replacing an earlier backup
pub(super) fn backup(path: &Path) -> Result<PathBuf> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

    let mut target = backup_path(path, &stamp);
    let mut n = 1;
    while target.exists() {
        target = backup_path(path, &format!("{}_{}", stamp, n));
        n += 1;
    }

    fs::copy(path, &target).with_context(|| {
        format!(
            "Failed to back up {} to {}",
            path.display(),
            target.display()
        )
    })?;
    Ok(target)
}

/// `<stem>_backup_<suffix>.<ext>` next to `path`
fn backup_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let mut name = format!("{}_backup_{}", stem, suffix);
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_cell(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Data,
    date_format: &Format,
) -> Result<()> {
    match cell {
        Data::Empty => {}
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            ws.write_string(row, col, s)?;
        }
        Data::Int(i) => {
            ws.write_number(row, col, *i as f64)?;
        }
        Data::Float(f) => {
            ws.write_number(row, col, *f)?;
        }
        Data::Bool(b) => {
            ws.write_boolean(row, col, *b)?;
        }
        Data::DateTime(dt) => {
            ws.write_number_with_format(row, col, dt.as_f64(), date_format)?;
        }
        Data::Error(e) => {
            ws.write_string(row, col, e.to_string())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_is_a_sibling() {
        let tmp = temp_path(Path::new("/data/work/book.xlsx"));
        assert_eq!(tmp, PathBuf::from("/data/work/book.xlsx.tmp"));
    }

    #[test]
    fn test_backup_path_keeps_extension() {
        let backup = backup_path(Path::new("/data/work/book.xlsx"), "20240101_100000");
        assert_eq!(backup, PathBuf::from("/data/work/book_backup_20240101_100000.xlsx"));
    }

    #[test]
    fn test_backup_never_replaces_an_earlier_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");
        fs::write(&path, b"first").unwrap();

        let first = backup(&path).unwrap();
        fs::write(&path, b"second").unwrap();
        let second = backup(&path).unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read(&first).unwrap(), b"first");
        assert_eq!(fs::read(&second).unwrap(), b"second");
    }

    #[test]
    fn test_formulas_survive_append() {
        use calamine::{Reader, Xlsx, open_workbook};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xlsx");

        let mut book = Workbook::new();
        let ws = book.add_worksheet();
        ws.set_name("Create Fail Modes").unwrap();
        ws.write_string(0, 0, "Function ID").unwrap();
        ws.write_string(0, 1, "Length").unwrap();
        ws.write_string(1, 0, "F001").unwrap();
        ws.write_formula(1, 1, Formula::new("=LEN(A2)").set_result("4"))
            .unwrap();
        book.save(&path).unwrap();

        append_rows(
            &path,
            "Change Log",
            &["Timestamp", "Status"],
            &[vec!["2024-01-01 10:00:00".into(), "Success".into()]],
        )
        .unwrap();

        let mut reopened: Xlsx<_> = open_workbook(&path).unwrap();
        let formulas = reopened.worksheet_formula("Create Fail Modes").unwrap();
        assert_eq!(formulas.get_value((1, 1)).map(String::as_str), Some("LEN(A2)"));

        let values = reopened.worksheet_range("Create Fail Modes").unwrap();
        assert_eq!(values.get_value((1, 1)).map(cell_to_string).as_deref(), Some("4"));
        assert!(reopened.sheet_names().contains(&"Change Log".to_string()));
    }

    #[test]
    fn test_append_aligned_rejects_unknown_column() {
        let mut sheet = RawSheet {
            name: "Change Log".to_string(),
            origin: (0, 0),
            cells: vec![vec![Data::String("Timestamp".to_string())]],
            formulas: BTreeMap::new(),
        };

        let err = append_aligned(&mut sheet, &["Timestamp", "Status"], &[]).unwrap_err();
        assert!(err.to_string().contains("'Status'"));
    }

    #[test]
    fn test_append_aligned_writes_header_into_empty_sheet() {
        let mut sheet = RawSheet {
            name: "Change Log".to_string(),
            origin: (4, 2),
            cells: Vec::new(),
            formulas: BTreeMap::new(),
        };

        append_aligned(&mut sheet, &["A", "B"], &[vec!["1".into(), "".into()]]).unwrap();

        assert_eq!(sheet.origin, (0, 0));
        assert_eq!(sheet.cells.len(), 2);
        assert_eq!(sheet.cells[1], vec![Data::String("1".to_string()), Data::Empty]);
    }
}
