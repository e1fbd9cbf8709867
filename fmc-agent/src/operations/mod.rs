//! Operation catalog, row parsing and command execution
//!
//! Flow: [`OperationRegistry`] describes what can be built, [`OperationParser`] turns workbook
//! rows into [`Operation`]s, [`CommandExecutor`] runs or simulates them.

pub mod executor;
pub mod parser;
pub mod registry;
pub mod template;

pub use executor::{CommandExecutor, ExecutionMode, ShellRunner};
pub use parser::{Operation, OperationParser, RejectedRow};
pub use registry::OperationRegistry;
