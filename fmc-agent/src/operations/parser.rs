//! Workbook rows -> executable operations
//!
//! Rows are read per template, in registration order. A row becomes an [`Operation`] when it is
//! not already processed, is actionable and builds cleanly. One bad row never aborts a sheet and
//! one unreadable sheet never aborts the parse.

use serde::Serialize;

use crate::schema::STATUS_COLUMN;
use crate::validation::is_actionable;
use crate::workbook::{Row, WorkbookSource, display_row};

use super::registry::OperationRegistry;
use super::template::OperationTemplate;

/// Status values meaning the row was already processed
const TERMINAL_STATUSES: &[&str] = &["completed", "success", "done"];

/// One executable unit of work derived from one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    pub operation_type: String,
    pub sheet_name: String,
    /// Spreadsheet row number (header is row 1)
    pub row_number: usize,
    pub row_data: Row,
    pub command: String,
}

/// An actionable row that could not be turned into a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub operation: String,
    pub sheet: String,
    pub row: usize,
    pub error: String,
    pub input_data: Row,
}

/// Outcome of a parse
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedOperations {
    pub operations: Vec<Operation>,
    pub rejected: Vec<RejectedRow>,
    /// Requested names with no registered template
    pub unknown: Vec<String>,
}

/// True when the status marker says the row was already processed
pub fn is_terminal_status(row: &Row) -> bool {
    row.get(STATUS_COLUMN)
        .map(|s| s.trim().to_lowercase())
        .is_some_and(|s| TERMINAL_STATUSES.contains(&s.as_str()))
}

pub struct OperationParser<'a, S: WorkbookSource + ?Sized> {
    source: &'a S,
    registry: &'a OperationRegistry,
}

impl<'a, S: WorkbookSource + ?Sized> OperationParser<'a, S> {
    pub fn new(source: &'a S, registry: &'a OperationRegistry) -> Self {
        Self { source, registry }
    }

    /// Parse the requested operations, or every registered one when `names` is `None`
    pub fn parse_operations(&self, names: Option<&[String]>) -> ParsedOperations {
        let mut parsed = ParsedOperations::default();

        let requested: Vec<String> = match names {
            Some(names) => names.to_vec(),
            None => self.registry.names().into_iter().map(String::from).collect(),
        };

        for name in &requested {
            match self.registry.by_name(name) {
                Some(template) => self.parse_template(template, &mut parsed),
                None => {
                    log::warn!("Unknown operation type: {}", name);
                    parsed.unknown.push(name.clone());
                }
            }
        }

        log::info!(
            "Parsed {} operations ({} rejected rows)",
            parsed.operations.len(),
            parsed.rejected.len()
        );

        parsed
    }

    fn parse_template(&self, template: &OperationTemplate, parsed: &mut ParsedOperations) {
        let sheet = match self.source.read_sheet(&template.sheet) {
            Ok(sheet) => sheet,
            Err(e) => {
                log::error!(
                    "Failed to parse operations for {} from sheet '{}': {:#}",
                    template.name,
                    template.sheet,
                    e
                );
                return;
            }
        };

        let mut count = 0;
        for (idx, row) in sheet.rows.into_iter().enumerate() {
            let row_number = display_row(idx);

            if is_terminal_status(&row) {
                log::debug!(
                    "Skipping {} row {}: already processed",
                    template.sheet,
                    row_number
                );
                continue;
            }

            if !is_actionable(&row, &template.required_columns) {
                log::debug!("Skipping {} row {}: no data", template.sheet, row_number);
                continue;
            }

            match self.registry.build_command(&template.name, &row) {
                Ok(command) => {
                    parsed.operations.push(Operation {
                        operation_type: template.name.clone(),
                        sheet_name: template.sheet.clone(),
                        row_number,
                        row_data: row,
                        command,
                    });
                    count += 1;
                }
                Err(e) => {
                    log::warn!(
                        "Skipping {} row {} ({}): {}",
                        template.sheet,
                        row_number,
                        template.name,
                        e
                    );
                    parsed.rejected.push(RejectedRow {
                        operation: template.name.clone(),
                        sheet: template.sheet.clone(),
                        row: row_number,
                        error: e.to_string(),
                        input_data: row,
                    });
                }
            }
        }

        log::info!(
            "Parsed {} {} operations from '{}'",
            count,
            template.name,
            template.sheet
        );
    }
}
