//! Operation template registry
//!
//! Built once at start-up and passed by reference to the validator and parser.

use crate::error::OperationBuildError;
use crate::schema;
use crate::workbook::Row;

use super::template::{CommandRule, OperationTemplate};

/// Templates keyed by operation name, queryable by sheet
///
/// Registration order is preserved and drives the order of validation issues and parsed
/// operations.
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    templates: Vec<OperationTemplate>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in FM&C operations
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(OperationTemplate::from_schema(
            "Create Fail Mode",
            &schema::FAIL_MODES,
            CommandRule::CreateFailMode,
        ));
        registry.register(OperationTemplate::from_schema(
            "Create Cause",
            &schema::CAUSES,
            CommandRule::CreateCause,
        ));
        registry.register(OperationTemplate::from_schema(
            "Create Control",
            &schema::CONTROLS,
            CommandRule::CreateControl,
        ));
        registry.register(OperationTemplate::from_schema(
            "Link Control Cause",
            &schema::CONTROL_CAUSES,
            CommandRule::LinkControlCause,
        ));
        registry
    }

    /// Register a template
    ///
    /// A template with the same name replaces the earlier one in place (last write wins).
    pub fn register(&mut self, template: OperationTemplate) {
        match self.templates.iter_mut().find(|t| t.name == template.name) {
            Some(existing) => {
                log::debug!("Replacing operation template '{}'", template.name);
                *existing = template;
            }
            None => self.templates.push(template),
        }
    }

    pub fn by_name(&self, name: &str) -> Option<&OperationTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn by_sheet(&self, sheet: &str) -> Vec<&OperationTemplate> {
        self.templates.iter().filter(|t| t.sheet == sheet).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name.as_str()).collect()
    }

    /// Sheets referenced by any template, deduplicated, in registration order
    pub fn required_sheets(&self) -> Vec<&str> {
        let mut sheets: Vec<&str> = Vec::new();
        for template in &self.templates {
            if !sheets.contains(&template.sheet.as_str()) {
                sheets.push(&template.sheet);
            }
        }
        sheets
    }

    /// Build the command for a row by operation name
    pub fn build_command(&self, name: &str, row: &Row) -> Result<String, OperationBuildError> {
        self.by_name(name)
            .ok_or_else(|| OperationBuildError::UnknownOperation {
                name: name.to_string(),
            })?
            .build_command(row)
    }
}
