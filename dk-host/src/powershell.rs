//! PowerShell invocation

use dk_error::DriverKitError;
use tracing::warn;

use crate::command::CommandRunner;
use crate::Result;

pub const POWERSHELL: &str = "powershell";

/// Arguments running `script` non-interactively with no profile
pub fn powershell_args(script: &str) -> Vec<String> {
    vec![
        "-NoProfile".to_string(),
        "-ExecutionPolicy".to_string(),
        "Bypass".to_string(),
        "-Command".to_string(),
        script.to_string(),
    ]
}

/// Run a PowerShell script and return its trimmed stdout
///
/// A non-zero exit is a [`DriverKitError::CommandFailed`] carrying stderr.
pub fn run_ps(runner: &dyn CommandRunner, script: &str) -> Result<String> {
    let output = runner.run(POWERSHELL, &powershell_args(script))?;
    if !output.success() {
        return Err(DriverKitError::CommandFailed {
            program: POWERSHELL.to_string(),
            code: output.code,
            stderr: output.stderr,
        });
    }
    Ok(output.stdout)
}

/// Run a PowerShell script for its effect; `true` when it exited cleanly
pub fn run_ps_step(runner: &dyn CommandRunner, script: &str) -> bool {
    match runner.run(POWERSHELL, &powershell_args(script)) {
        Ok(output) if output.success() => true,
        Ok(output) => {
            warn!(code = ?output.code, "PowerShell error: {}", output.stderr);
            false
        }
        Err(e) => {
            warn!(error = %e, "PowerShell unavailable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandOutput, MockCommandRunner};

    #[test]
    fn test_args_wrap_script() {
        let args = powershell_args("Get-Date");
        assert_eq!(args.len(), 5);
        assert_eq!(args[3], "-Command");
        assert_eq!(args[4], "Get-Date");
    }

    #[test]
    fn test_run_ps_nonzero_exit_is_command_failed() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|program, args| program == POWERSHELL && args[4] == "Get-Thing")
            .returning(|_, _| {
                Ok(CommandOutput {
                    code: Some(1),
                    stdout: "partial".to_string(),
                    stderr: "Get-Thing : not recognized".to_string(),
                })
            });

        let err = run_ps(&runner, "Get-Thing").unwrap_err();
        match err {
            DriverKitError::CommandFailed { program, code, stderr } => {
                assert_eq!(program, POWERSHELL);
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "Get-Thing : not recognized");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_run_ps_returns_stdout() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_, _| {
            Ok(CommandOutput {
                code: Some(0),
                stdout: "31.0.101.4502".to_string(),
                stderr: String::new(),
            })
        });
        assert_eq!(run_ps(&runner, "Get-Version").unwrap(), "31.0.101.4502");
    }

    #[test]
    fn test_run_ps_step_outcomes() {
        let mut ok = MockCommandRunner::new();
        ok.expect_run()
            .returning(|_, _| Ok(CommandOutput { code: Some(0), ..Default::default() }));
        assert!(run_ps_step(&ok, "x"));

        let mut missing = MockCommandRunner::new();
        missing.expect_run().returning(|program, _| {
            Err(DriverKitError::CommandSpawn {
                program: program.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        });
        assert!(!run_ps_step(&missing, "x"));
    }
}
