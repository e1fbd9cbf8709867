//! Workbook validation
//!
//! A row is *actionable* when at least one of its required columns has content. Actionable
//! rows must be complete: every required column populated. Rows with all required columns
//! blank are inert and ignored everywhere downstream.

use std::collections::BTreeSet;

use crate::error::ValidationError;
use crate::operations::OperationRegistry;
use crate::schema::{self, CHANGE_LOG_SHEET};
use crate::workbook::{Row, Sheet, WorkbookSource, display_row};

fn has_content(row: &Row, column: &str) -> bool {
    row.get(column).is_some_and(|v| !v.trim().is_empty())
}

/// True iff at least one required column has non-blank content
pub fn is_actionable(row: &Row, required_columns: &[String]) -> bool {
    required_columns.iter().any(|c| has_content(row, c))
}

/// Validate the rows of one sheet
///
/// The observed column set is taken from the rows themselves, so an empty row list yields no
/// issues. Columns missing from the sheet are reported once at sheet level and are not
/// repeated for every row.
pub fn validate_sheet(sheet_name: &str, rows: &[Row], required_columns: &[String]) -> Vec<String> {
    if rows.is_empty() {
        return Vec::new();
    }

    let observed: BTreeSet<&str> = rows
        .iter()
        .flat_map(|r| r.keys().map(String::as_str))
        .collect();

    let mut issues = missing_columns(sheet_name, &observed, required_columns);

    let present: Vec<String> = required_columns
        .iter()
        .filter(|c| observed.contains(c.as_str()))
        .cloned()
        .collect();

    for (idx, row) in rows.iter().enumerate() {
        if !is_actionable(row, required_columns) {
            continue;
        }

        let missing: Vec<&str> = present
            .iter()
            .filter(|c| !has_content(row, c))
            .map(String::as_str)
            .collect();

        if !missing.is_empty() {
            issues.push(format!(
                "Sheet '{}' Row {}: Actionable row missing required data in columns: {}",
                sheet_name,
                display_row(idx),
                missing.join(", ")
            ));
        }
    }

    issues
}

fn missing_columns<S: AsRef<str>>(
    sheet_name: &str,
    observed: &BTreeSet<&str>,
    required_columns: &[S],
) -> Vec<String> {
    required_columns
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| !observed.contains(*c))
        .map(|c| format!("Sheet '{}': Missing required column '{}'", sheet_name, c))
        .collect()
}

/// Header-level checks for a sheet, then row checks through [`validate_sheet`]
///
/// Rows carry every header column, so for a sheet with data the two observed sets agree. A
/// header-only sheet is still checked against its header.
fn check_sheet(sheet: &Sheet, required_columns: &[String]) -> Vec<String> {
    if sheet.rows.is_empty() {
        let observed: BTreeSet<&str> = sheet.columns.iter().map(String::as_str).collect();
        missing_columns(&sheet.name, &observed, required_columns)
    } else {
        validate_sheet(&sheet.name, &sheet.rows, required_columns)
    }
}

/// Required columns for a sheet: its schema, else the union over its templates
pub fn required_columns_for(sheet: &str, registry: &OperationRegistry) -> Vec<String> {
    if let Some(schema) = schema::schema_for(sheet) {
        return schema.required_columns();
    }

    let mut columns: Vec<String> = Vec::new();
    for template in registry.by_sheet(sheet) {
        for column in &template.required_columns {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }
    columns
}

/// Validate a whole workbook against the registry
///
/// Every issue from every sheet is collected before failing, and the error is raised at most
/// once. A workbook that cannot be opened fails with a single "Failed to read workbook" issue.
pub fn validate_workbook<S>(source: &S, registry: &OperationRegistry) -> Result<(), ValidationError>
where
    S: WorkbookSource + ?Sized,
{
    let available = match source.sheet_names() {
        Ok(names) => names,
        Err(e) => {
            log::error!("Failed to read workbook: {:#}", e);
            return Err(ValidationError::new(vec![format!(
                "Failed to read workbook: {:#}",
                e
            )]));
        }
    };

    log::debug!("Available sheets: {:?}", available);

    let required = registry.required_sheets();
    let mut issues: Vec<String> = required
        .iter()
        .filter(|s| !available.iter().any(|a| a == *s))
        .map(|s| format!("Missing required sheet: '{}'", s))
        .collect();

    for sheet_name in required.iter().filter(|s| available.iter().any(|a| a == *s)) {
        let sheet = match source.read_sheet(sheet_name) {
            Ok(sheet) => sheet,
            Err(e) => {
                issues.push(format!("Failed to read sheet '{}': {:#}", sheet_name, e));
                continue;
            }
        };

        let required_columns = required_columns_for(sheet_name, registry);
        issues.extend(check_sheet(&sheet, &required_columns));
    }

    if available.iter().any(|a| a == CHANGE_LOG_SHEET) {
        match source.read_sheet(CHANGE_LOG_SHEET) {
            // A blank audit sheet gets its header on first append
            Ok(sheet) if sheet.columns.is_empty() => {
                log::debug!("Sheet '{}' has no header yet", CHANGE_LOG_SHEET);
            }
            Ok(sheet) => {
                let observed: BTreeSet<&str> = sheet.columns.iter().map(String::as_str).collect();
                issues.extend(missing_columns(
                    CHANGE_LOG_SHEET,
                    &observed,
                    schema::CHANGE_LOG.required_columns,
                ));
            }
            Err(e) => issues.push(format!("Failed to read sheet '{}': {:#}", CHANGE_LOG_SHEET, e)),
        }
    }

    log::info!(
        "Validation completed. Valid: {}, Issues: {}",
        issues.is_empty(),
        issues.len()
    );

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(issues))
    }
}
