//! `plan` command

use std::fs;

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;

use crate::cli::{PlanArgs, requested_ops};
use crate::config::AppConfig;
use crate::operations::{Operation, OperationParser, OperationRegistry, RejectedRow};
use crate::validation::validate_workbook;
use crate::workbook::{WorkbookSource, XlsxWorkbook};

/// What a run would do
#[derive(Debug, Serialize)]
pub struct Plan {
    pub server: Option<String>,
    pub operations: Vec<Operation>,
    pub rejected: Vec<RejectedRow>,
}

/// Validate, then parse without executing anything
pub fn build_plan<S>(
    source: &S,
    registry: &OperationRegistry,
    ops: Option<&[String]>,
    server: Option<String>,
) -> Result<Plan>
where
    S: WorkbookSource + ?Sized,
{
    validate_workbook(source, registry).context("Workbook validation failed")?;

    let parsed = OperationParser::new(source, registry).parse_operations(ops);
    for name in &parsed.unknown {
        log::warn!("No operation named '{}'", name);
    }

    Ok(Plan {
        server,
        operations: parsed.operations,
        rejected: parsed.rejected,
    })
}

pub fn handle_plan_command(args: PlanArgs, config: &AppConfig) -> Result<()> {
    let workbook = XlsxWorkbook::new(&args.workbook.file);
    let registry = OperationRegistry::builtin();

    let plan = build_plan(
        &workbook,
        &registry,
        requested_ops(&args.ops),
        config.rvs_server.clone(),
    )?;
    let json = serde_json::to_string_pretty(&plan).context("Failed to format plan as JSON")?;

    match args.output {
        Some(path) => {
            fs::write(&path, &json)
                .with_context(|| format!("Failed to write plan to: {}", path.display()))?;
            println!(
                "Plan with {} operations written to {}",
                plan.operations.len(),
                path.display().to_string().bright_green()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::workbook::sample::sample_workbook;
    use crate::workbook::{MemoryWorkbook, Sheet};

    fn sample() -> MemoryWorkbook {
        sample_workbook()
    }

    #[test]
    fn test_plan_json_shape() {
        let registry = OperationRegistry::builtin();
        let ops = vec!["Create Fail Mode".to_string()];

        let plan = build_plan(
            &sample(),
            &registry,
            Some(ops.as_slice()),
            Some("rvs:7001".into()),
        )
        .unwrap();
        let json = serde_json::to_value(&plan).unwrap();

        assert_eq!(json["server"], "rvs:7001");
        assert_eq!(json["operations"].as_array().unwrap().len(), 2);
        assert_eq!(json["operations"][0]["row_number"], 2);
        assert_eq!(json["operations"][0]["operation_type"], "Create Fail Mode");
        assert_eq!(json["operations"][0]["row_data"]["Function ID"], "FS-001");
        assert!(json["rejected"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_plan_refuses_invalid_workbook() {
        let registry = OperationRegistry::builtin();
        let workbook = sample().with_sheet(Sheet::from_records(
            "Create Causes",
            &["Fail Mode ID", "Description", "Probability"],
            &[&["FM-001", "", "High"]],
        ));

        let err = build_plan(&workbook, &registry, None, None).unwrap_err();
        let validation = err.downcast_ref::<ValidationError>().unwrap();
        assert_eq!(validation.issues.len(), 1);
        assert!(validation.issues[0].contains("Row 2"));
    }
}
