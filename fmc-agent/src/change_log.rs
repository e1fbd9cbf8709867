//! Audit trail of executed operations
//!
//! Each executed operation appends one row to the `Change Log` sheet of the workbook it came
//! from. Recording is fail-soft: a failed append is logged and dropped.

use chrono::Local;

use crate::operations::Operation;
use crate::schema::{self, CHANGE_LOG_SHEET};
use crate::workbook::{Row, WorkbookStore};

/// Default cap on stored CLI output, in characters
pub const DEFAULT_MAX_OUTPUT_LEN: usize = 2000;

const TRUNCATION_SUFFIX: &str = "... [truncated]";

/// One audit row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeLogEntry {
    pub timestamp: String,
    pub operation: String,
    pub status: String,
    pub details: String,
    pub cli_output: String,
}

impl ChangeLogEntry {
    pub fn new(
        operation: &Operation,
        success: bool,
        output: &str,
        extracted_id: Option<&str>,
        max_output_len: usize,
    ) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            operation: format!("{} - Row {}", operation.operation_type, operation.row_number),
            status: if success { "Success" } else { "Failed" }.to_string(),
            details: match extracted_id {
                Some(id) => format!("ID: {}", id),
                None => "No ID extracted".to_string(),
            },
            cli_output: truncate_output(output, max_output_len),
        }
    }

    /// Values in audit-header order
    pub fn to_values(&self) -> Vec<String> {
        vec![
            self.timestamp.clone(),
            self.operation.clone(),
            self.status.clone(),
            self.details.clone(),
            self.cli_output.clone(),
        ]
    }
}

/// Cap `output` at `max_len` characters, marking the cut
pub fn truncate_output(output: &str, max_len: usize) -> String {
    if output.chars().count() <= max_len {
        return output.to_string();
    }

    let mut truncated: String = output.chars().take(max_len).collect();
    truncated.push_str(TRUNCATION_SUFFIX);
    truncated
}

pub struct ChangeLog<S: WorkbookStore> {
    store: S,
    max_output_len: usize,
}

impl<S: WorkbookStore> ChangeLog<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_output_len: DEFAULT_MAX_OUTPUT_LEN,
        }
    }

    pub fn with_max_output_len(mut self, max_output_len: usize) -> Self {
        self.max_output_len = max_output_len;
        self
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record one executed operation; returns whether the row was persisted
    pub fn append_entry(
        &mut self,
        operation: &Operation,
        success: bool,
        output: &str,
        extracted_id: Option<&str>,
    ) -> bool {
        let entry = ChangeLogEntry::new(
            operation,
            success,
            output,
            extracted_id,
            self.max_output_len,
        );

        match self.store.append_rows(
            CHANGE_LOG_SHEET,
            schema::CHANGE_LOG.required_columns,
            &[entry.to_values()],
        ) {
            Ok(()) => {
                log::debug!("Change log entry added: {}", entry.operation);
                true
            }
            Err(e) => {
                log::error!(
                    "Failed to write change log entry for {} (sheet '{}'): {:#}",
                    entry.operation,
                    operation.sheet_name,
                    e
                );
                false
            }
        }
    }

    /// Up to the last `count` audit rows, oldest first
    pub fn get_recent_entries(&self, count: usize) -> Vec<Row> {
        match self.store.read_sheet(CHANGE_LOG_SHEET) {
            Ok(sheet) => {
                let skip = sheet.rows.len().saturating_sub(count);
                sheet.rows.into_iter().skip(skip).collect()
            }
            Err(e) => {
                log::debug!("No change log entries available: {:#}", e);
                Vec::new()
            }
        }
    }
}
