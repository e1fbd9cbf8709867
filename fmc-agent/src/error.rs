//! Error kinds surfaced by the validation and command-generation engine
//!
//! - [`ValidationError`] aggregates every structural/content issue found in a workbook.
//!   The CLI maps it to exit code 2.
//! - [`OperationBuildError`] describes a single row that could not be turned into a command.
//!   The parser recovers from it locally (row skipped, logged).
//!
//! Execution failures are not errors: the executor reports them as data (see
//! `operations::executor::ExecutionResult`).

/// Aggregated list of workbook issues
///
/// Never constructed with an empty issue list by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<String>,
}

impl ValidationError {
    pub fn new(issues: Vec<String>) -> Self {
        Self { issues }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Validation failed with {} issues: {}",
            self.issues.len(),
            self.issues.join("; ")
        )
    }
}

impl std::error::Error for ValidationError {}

/// Error building a command for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationBuildError {
    /// A required column is absent or blank in the row
    MissingColumn { column: String, operation: String },
    /// No template is registered under this name
    UnknownOperation { name: String },
}

impl std::fmt::Display for OperationBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationBuildError::MissingColumn { column, operation } => {
                write!(
                    f,
                    "Missing required column '{}' for operation '{}'",
                    column, operation
                )
            }
            OperationBuildError::UnknownOperation { name } => {
                write!(f, "Unknown operation: '{}'", name)
            }
        }
    }
}

impl std::error::Error for OperationBuildError {}
