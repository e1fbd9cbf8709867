//! Operation templates: required columns plus a command-building rule
//!
//! Each operation kind is a [`CommandRule`] variant holding a pure row -> command mapping.
//! Values are substituted into a fixed pattern; no user text is ever used as a format string.

use serde::Serialize;

use crate::error::OperationBuildError;
use crate::schema::SheetSchema;
use crate::workbook::Row;

/// Command-building rule, one variant per operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommandRule {
    /// `rvs create-failmode`
    CreateFailMode,
    /// `rvs create-cause`
    CreateCause,
    /// `rvs create-control`
    CreateControl,
    /// `rvs link-control-cause`
    LinkControlCause,
}

impl CommandRule {
    /// Render the command for a row
    ///
    /// Callers are expected to have checked the required columns; absent values render empty.
    pub fn render(&self, row: &Row) -> String {
        match self {
            CommandRule::CreateFailMode => format!(
                r#"rvs create-failmode --function-id "{}" --description "{}" --severity "{}""#,
                quoted(row, "Function ID"),
                quoted(row, "Description"),
                quoted(row, "Severity"),
            ),
            CommandRule::CreateCause => format!(
                r#"rvs create-cause --fail-mode-id "{}" --description "{}" --probability "{}""#,
                quoted(row, "Fail Mode ID"),
                quoted(row, "Description"),
                quoted(row, "Probability"),
            ),
            CommandRule::CreateControl => format!(
                r#"rvs create-control --cause-id "{}" --name "{}" --type "{}""#,
                quoted(row, "Cause ID"),
                quoted(row, "Control Name"),
                quoted(row, "Control Type"),
            ),
            CommandRule::LinkControlCause => format!(
                r#"rvs link-control-cause --control-id "{}" --cause-id "{}""#,
                quoted(row, "Control ID"),
                quoted(row, "Cause ID"),
            ),
        }
    }
}

/// Trimmed cell value with `"` escaped as `\"`
fn quoted(row: &Row, column: &str) -> String {
    row.get(column)
        .map(|v| v.trim().replace('"', "\\\""))
        .unwrap_or_default()
}

/// Immutable description of one operation kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationTemplate {
    /// Sheet the rows come from
    pub sheet: String,
    /// Unique operation name (e.g., "Create Fail Mode")
    pub name: String,
    /// Columns that must all be populated for a row to build
    pub required_columns: Vec<String>,
    pub rule: CommandRule,
}

impl OperationTemplate {
    pub fn new(
        sheet: impl Into<String>,
        name: impl Into<String>,
        required_columns: &[&str],
        rule: CommandRule,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            name: name.into(),
            required_columns: required_columns.iter().map(|c| c.to_string()).collect(),
            rule,
        }
    }

    /// Template whose sheet and required columns come from a schema
    pub fn from_schema(name: impl Into<String>, schema: &SheetSchema, rule: CommandRule) -> Self {
        Self::new(schema.sheet, name, schema.required_columns, rule)
    }

    /// Build the command for a row
    ///
    /// Fails on the first required column that is absent or blank after trimming.
    pub fn build_command(&self, row: &Row) -> Result<String, OperationBuildError> {
        for column in &self.required_columns {
            let populated = row.get(column).is_some_and(|v| !v.trim().is_empty());
            if !populated {
                return Err(OperationBuildError::MissingColumn {
                    column: column.clone(),
                    operation: self.name.clone(),
                });
            }
        }

        Ok(self.rule.render(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn fail_mode_template() -> OperationTemplate {
        OperationTemplate::from_schema("Create Fail Mode", &schema::FAIL_MODES, CommandRule::CreateFailMode)
    }

    #[test]
    fn test_build_create_fail_mode() {
        let command = fail_mode_template()
            .build_command(&row(&[
                ("Function ID", "F001"),
                ("Description", "Test failure mode"),
                ("Severity", "High"),
            ]))
            .unwrap();

        assert_eq!(
            command,
            r#"rvs create-failmode --function-id "F001" --description "Test failure mode" --severity "High""#
        );
    }

    #[test]
    fn test_build_create_cause() {
        let template =
            OperationTemplate::from_schema("Create Cause", &schema::CAUSES, CommandRule::CreateCause);
        let command = template
            .build_command(&row(&[
                ("Fail Mode ID", "FM001"),
                ("Description", "Test cause"),
                ("Probability", "Medium"),
            ]))
            .unwrap();

        assert_eq!(
            command,
            r#"rvs create-cause --fail-mode-id "FM001" --description "Test cause" --probability "Medium""#
        );
    }

    #[test]
    fn test_build_control_and_link() {
        let control =
            OperationTemplate::from_schema("Create Control", &schema::CONTROLS, CommandRule::CreateControl);
        assert_eq!(
            control
                .build_command(&row(&[
                    ("Cause ID", "C-001"),
                    ("Control Name", "Coolant Pump Monitoring"),
                    ("Control Type", "Detection"),
                ]))
                .unwrap(),
            r#"rvs create-control --cause-id "C-001" --name "Coolant Pump Monitoring" --type "Detection""#
        );

        let link = OperationTemplate::from_schema(
            "Link Control Cause",
            &schema::CONTROL_CAUSES,
            CommandRule::LinkControlCause,
        );
        assert_eq!(
            link.build_command(&row(&[("Control ID", "CT-001"), ("Cause ID", "C-001")]))
                .unwrap(),
            r#"rvs link-control-cause --control-id "CT-001" --cause-id "C-001""#
        );
    }

    #[test]
    fn test_quotes_in_description_are_escaped() {
        let command = fail_mode_template()
            .build_command(&row(&[
                ("Function ID", "F001"),
                ("Description", r#"He said "hi""#),
                ("Severity", "Low"),
            ]))
            .unwrap();

        assert!(command.contains(r#"He said \"hi\""#));
        assert!(command.contains(r#"--description "He said \"hi\"""#));
    }

    #[test]
    fn test_values_are_trimmed() {
        let command = fail_mode_template()
            .build_command(&row(&[
                ("Function ID", "  F001 "),
                ("Description", "Overheat\t"),
                ("Severity", " High"),
            ]))
            .unwrap();

        assert!(command.contains(r#"--function-id "F001""#));
        assert!(command.contains(r#"--description "Overheat""#));
    }

    #[test]
    fn test_build_is_deterministic() {
        let template = fail_mode_template();
        let input = row(&[
            ("Function ID", "F001"),
            ("Description", "Engine Overheat"),
            ("Severity", "High"),
            ("Agent Status", ""),
        ]);

        let first = template.build_command(&input).unwrap();
        for _ in 0..10 {
            assert_eq!(template.build_command(&input.clone()).unwrap(), first);
        }
    }

    #[test]
    fn test_missing_column_names_first_missing() {
        let err = fail_mode_template()
            .build_command(&row(&[("Function ID", "F001"), ("Description", " ")]))
            .unwrap_err();

        assert_eq!(
            err,
            OperationBuildError::MissingColumn {
                column: "Description".to_string(),
                operation: "Create Fail Mode".to_string(),
            }
        );
    }
}
