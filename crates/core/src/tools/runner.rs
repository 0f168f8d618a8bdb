use std::process::Command;

use crate::tools::{Invocation, ToolError, ToolRunner};

/// Runs tools as child processes, capturing stdout and stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner;

impl ToolRunner for CommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<String, ToolError> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()
            .map_err(|source| ToolError::Spawn { command: invocation.signature(), source })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        if !output.status.success() {
            return Err(ToolError::Failed {
                command: invocation.signature(),
                status: output.status.to_string(),
                code: output.status.code(),
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(stdout)
    }
}
