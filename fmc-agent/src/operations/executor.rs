//! Command execution
//!
//! The executor never fails: every outcome, including timeouts and spawn errors, comes back as
//! an [`ExecutionResult`] whose `success` flag callers inspect.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;

use super::parser::Operation;

/// Default ceiling for one external command
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Identifier patterns, tried in order; first match wins
const ID_PATTERNS: &[&str] = &[
    r"(?i)ID:\s*(\d+)",
    r"(?i)Created.*?ID\s*(\d+)",
    r"(?i)Issue\s*(\d+)\s*created",
    r"#(\d+)",
    r"\b(\d{4,})\b",
];

static ID_REGEXES: Lazy<Vec<Regex>> = Lazy::new(|| {
    ID_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
});

/// Pull an identifier out of free-form command output
pub fn extract_id(output: &str) -> Option<String> {
    ID_REGEXES
        .iter()
        .find_map(|re| re.captures(output))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Report success without running anything
    Simulate,
    /// Run the command through the configured runner
    Execute,
}

/// Result triple of one execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    /// stdout on success, stderr on failure, or a diagnostic
    pub output: String,
    pub extracted_id: Option<String>,
}

impl ExecutionResult {
    fn failure(output: String) -> Self {
        Self {
            success: false,
            output,
            extracted_id: None,
        }
    }
}

/// Raw outcome of a finished process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Process-invocation boundary
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str) -> Result<CommandOutput>;
}

/// Runs commands through the platform shell
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    rvs_server: Option<String>,
}

impl ShellRunner {
    pub fn new(rvs_server: Option<String>) -> Self {
        Self { rvs_server }
    }

    fn command(&self, command: &str) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };

        if let Some(server) = &self.rvs_server {
            cmd.env("RVS_SERVER", server);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> Result<CommandOutput> {
        let output = self
            .command(command)
            .output()
            .await
            .context("failed to spawn shell")?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

pub struct CommandExecutor {
    mode: ExecutionMode,
    runner: Box<dyn CommandRunner>,
    timeout: Duration,
}

impl CommandExecutor {
    pub fn new(mode: ExecutionMode, runner: Box<dyn CommandRunner>) -> Self {
        Self {
            mode,
            runner,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn execute(&self, operation: &Operation) -> ExecutionResult {
        match self.mode {
            ExecutionMode::Simulate => simulate(operation),
            ExecutionMode::Execute => self.run(&operation.command).await,
        }
    }

    async fn run(&self, command: &str) -> ExecutionResult {
        log::info!("Executing: {}", command);

        let output = match tokio::time::timeout(self.timeout, self.runner.run(command)).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                log::error!("Failed to execute command: {:#}", e);
                return ExecutionResult::failure(format!("Failed to execute command: {:#}", e));
            }
            Err(_) => {
                log::error!("Command timed out: {}", command);
                return ExecutionResult::failure(format!(
                    "Command timed out after {} seconds: {}",
                    self.timeout.as_secs(),
                    command
                ));
            }
        };

        let text = if output.success {
            output.stdout
        } else {
            log::warn!("Command failed: {}", output.stderr.trim());
            output.stderr
        };
        let extracted_id = extract_id(&text);

        ExecutionResult {
            success: output.success,
            output: text,
            extracted_id,
        }
    }
}

/// Placeholder id for a simulated run; stable for a given operation
pub fn simulated_id(operation: &Operation) -> String {
    format!(
        "SIM-{}-{:04}",
        operation.operation_type.replace(' ', ""),
        operation.row_number
    )
}

fn simulate(operation: &Operation) -> ExecutionResult {
    let id = simulated_id(operation);
    log::info!("[DRY-RUN] {}", operation.command);

    ExecutionResult {
        success: true,
        output: format!(
            "[DRY-RUN] Would execute: {}\n[DRY-RUN] Simulated success - Generated ID: {}",
            operation.command, id
        ),
        extracted_id: Some(id),
    }
}
