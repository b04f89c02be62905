use crate::error::{Result, VivError};
use std::process::{Command, ExitStatus, Output};

/// Execute a command and capture its output
pub fn execute_command(cmd: &str, args: &[&str]) -> Result<Output> {
    let output = Command::new(cmd)
        .args(args)
        .output()?;

    Ok(output)
}

/// Run a command attached to the current terminal and fail on a non-zero exit
pub fn run_inherited(cmd: &str, args: &[String]) -> Result<ExitStatus> {
    let status = Command::new(cmd)
        .args(args)
        .status()
        .map_err(|e| VivError::Helm(format!("failed to start {cmd}: {e}")))?;

    if !status.success() {
        return Err(VivError::Helm(format!("{cmd} exited with {status}")));
    }
    Ok(status)
}
