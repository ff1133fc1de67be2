//! External command execution
//!
//! Every host adapter goes through a [`CommandRunner`] so tests can script
//! tool output without touching the machine.

use dk_error::DriverKitError;
use std::process::Command;
use tracing::{debug, info, warn};

use crate::Result;

/// Captured result of one external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external programs synchronously
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// `Err` only when the program could not be launched
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

/// Runs commands on the local machine, blocking until they exit
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        debug!(program, ?args, "Running external command");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| DriverKitError::CommandSpawn {
                program: program.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Run a tool whose output is progress text for the operator
///
/// Stdout is logged as-is; stderr is logged when the tool fails.
pub fn run_logged(runner: &dyn CommandRunner, program: &str, args: &[String]) -> Result<CommandOutput> {
    let output = runner.run(program, args)?;
    if !output.stdout.is_empty() {
        info!("{}", output.stdout);
    }
    if !output.success() && !output.stderr.is_empty() {
        warn!(program, code = ?output.code, "{}", output.stderr);
    }
    Ok(output)
}
