//! Runs the forge test suite and captures its console output.

use crate::error::ReportError;
use std::path::PathBuf;
use std::process::{Command, Output};

/// One-shot invocation of `forge clean && forge test --fork-url <rpc> -vv`.
#[derive(Debug, Clone)]
pub struct ForgeRunner {
    pub program: String,
    pub rpc: String,
    /// Working directory of the forge project; current directory if unset.
    pub project: Option<PathBuf>,
}

impl ForgeRunner {
    pub fn new(rpc: impl Into<String>) -> Self {
        Self {
            program: "forge".to_string(),
            rpc: rpc.into(),
            project: None,
        }
    }

    /// Run the suite and return its full stdout.
    pub fn run(&self) -> Result<String, ReportError> {
        if self.rpc.trim().is_empty() {
            return Err(ReportError::MissingRpc);
        }

        self.exec(&["clean"])?;
        let out = self.exec(&["test", "--fork-url", &self.rpc, "-vv"])?;
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    fn exec(&self, args: &[&str]) -> Result<Output, ReportError> {
        let command = format!("{} {}", self.program, args.join(" "));
        log::info!("running {}", command);

        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        if let Some(dir) = &self.project {
            cmd.current_dir(dir);
        }

        let out = cmd
            .output()
            .map_err(|e| ReportError::ExternalProcessFailure {
                command: command.clone(),
                reason: format!("could not be started: {}", e),
            })?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let excerpt: String = stderr.trim().lines().take(20).collect::<Vec<_>>().join("\n");
            return Err(ReportError::ExternalProcessFailure {
                command,
                reason: format!("exited with {}: {}", out.status, excerpt),
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn runner(program: &str, rpc: &str) -> ForgeRunner {
        ForgeRunner {
            program: program.to_string(),
            ..ForgeRunner::new(rpc)
        }
    }

    #[test]
    fn blank_rpc_is_rejected_before_spawning() {
        assert_eq!(runner("forge", "  ").run(), Err(ReportError::MissingRpc));
    }

    #[test]
    fn missing_binary_is_an_external_failure() {
        let err = runner("definitely-not-a-forge-binary", "http://localhost:8545")
            .run()
            .unwrap_err();
        assert!(matches!(err, ReportError::ExternalProcessFailure { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn failing_exit_status_is_an_external_failure() {
        let err = runner("false", "http://localhost:8545").run().unwrap_err();
        match err {
            ReportError::ExternalProcessFailure { command, .. } => {
                assert_eq!(command, "false clean")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn returns_stdout_of_the_test_invocation() {
        let out = runner("echo", "http://localhost:8545").run().unwrap();
        assert_eq!(out, "test --fork-url http://localhost:8545 -vv\n");
    }
}
