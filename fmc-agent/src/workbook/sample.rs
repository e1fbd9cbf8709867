//! Demonstration workbook
//!
//! Every operation sheet plus an empty `Change Log`. Includes one already completed row and one
//! blank row so `plan` and `run` show both skip paths.

use std::path::Path;

use anyhow::Result;

use super::{MemoryWorkbook, Sheet, XlsxWorkbook};
use crate::schema::{self, STATUS_COLUMN};

fn with_status(columns: &[&'static str]) -> Vec<&'static str> {
    let mut columns = columns.to_vec();
    columns.push(STATUS_COLUMN);
    columns
}

/// Sheets of the demonstration workbook, in workbook order
pub fn sample_sheets() -> Vec<Sheet> {
    vec![
        Sheet::from_records(
            schema::FAIL_MODES.sheet,
            &with_status(schema::FAIL_MODES.required_columns),
            &[
                &["FS-001", "Engine Overheat", "High", ""],
                &["FS-001", "Engine Underspeed", "Medium", ""],
                &["FS-002", "Fuel Leak", "High", "Completed"],
                &["", "", "", ""],
            ],
        ),
        Sheet::from_records(
            schema::CAUSES.sheet,
            &with_status(schema::CAUSES.required_columns),
            &[
                &["FM-001", "Coolant Pump Failure", "Medium", ""],
                &["FM-001", "Radiator Blockage", "Low", ""],
                &["FM-002", "Fuel Supply Restriction", "Medium", ""],
            ],
        ),
        Sheet::from_records(
            schema::CONTROLS.sheet,
            &with_status(schema::CONTROLS.required_columns),
            &[
                &["C-001", "Coolant Pump Monitoring", "Detection", ""],
                &["C-002", "Radiator Inspection", "Prevention", ""],
                &["C-003", "Fuel Flow Sensor", "Detection", ""],
            ],
        ),
        Sheet::from_records(
            schema::CONTROL_CAUSES.sheet,
            &with_status(schema::CONTROL_CAUSES.required_columns),
            &[
                &["CT-001", "C-001", ""],
                &["CT-002", "C-002", ""],
                &["CT-003", "C-003", ""],
            ],
        ),
        Sheet::from_records(schema::CHANGE_LOG.sheet, schema::CHANGE_LOG.required_columns, &[]),
    ]
}

/// The demonstration workbook held in memory
pub fn sample_workbook() -> MemoryWorkbook {
    sample_sheets()
        .into_iter()
        .fold(MemoryWorkbook::new(), MemoryWorkbook::with_sheet)
}

/// Write the demonstration workbook to `path`
pub fn write_sample_workbook(path: &Path) -> Result<XlsxWorkbook> {
    log::info!("Writing sample workbook to {}", path.display());
    XlsxWorkbook::create(path, sample_workbook().sheets())
}
