//! Sheet schemas of the FM&C modification workbook
//!
//! Static table of sheet name -> required columns. Column order is the display order;
//! validation only cares about membership.

/// Name of the audit sheet written by the change log
pub const CHANGE_LOG_SHEET: &str = "Change Log";

/// Column holding the per-row processing marker
pub const STATUS_COLUMN: &str = "Agent Status";

/// Required columns of one sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSchema {
    pub sheet: &'static str,
    pub required_columns: &'static [&'static str],
}

impl SheetSchema {
    pub fn required_columns(&self) -> Vec<String> {
        self.required_columns.iter().map(|c| c.to_string()).collect()
    }
}

pub const FAIL_MODES: SheetSchema = SheetSchema {
    sheet: "Create Fail Modes",
    required_columns: &["Function ID", "Description", "Severity"],
};

pub const CAUSES: SheetSchema = SheetSchema {
    sheet: "Create Causes",
    required_columns: &["Fail Mode ID", "Description", "Probability"],
};

pub const CONTROLS: SheetSchema = SheetSchema {
    sheet: "Create Controls",
    required_columns: &["Cause ID", "Control Name", "Control Type"],
};

pub const CONTROL_CAUSES: SheetSchema = SheetSchema {
    sheet: "Create Control Causes",
    required_columns: &["Control ID", "Cause ID"],
};

pub const CHANGE_LOG: SheetSchema = SheetSchema {
    sheet: CHANGE_LOG_SHEET,
    required_columns: &["Timestamp", "Operation", "Status", "Details", "CLI Output"],
};

/// Every known sheet, operation sheets first
pub const SHEET_SCHEMAS: &[SheetSchema] = &[FAIL_MODES, CAUSES, CONTROLS, CONTROL_CAUSES, CHANGE_LOG];

/// Look up the schema of a sheet by exact name
pub fn schema_for(sheet: &str) -> Option<&'static SheetSchema> {
    SHEET_SCHEMAS.iter().find(|s| s.sheet == sheet)
}
