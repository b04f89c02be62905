//! Forwarding commands to the helm binary.

pub mod flags;

use log::info;

use crate::common::command_utils::{execute_command, run_inherited};
use crate::error::Result;

pub use flags::{HelmFlags, name_and_chart, positional_args};

/// A helm invocation, built up from the user's arguments plus generated override files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelmCommand {
    bin: String,
    args: Vec<String>,
}

impl HelmCommand {
    pub fn new(bin: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            bin: bin.into(),
            args,
        }
    }

    /// Append `-f <file>` for every override file, keeping their order.
    pub fn with_value_files<P: AsRef<std::path::Path>>(mut self, files: &[P]) -> Self {
        for file in files {
            self.args.push("-f".to_string());
            self.args.push(file.as_ref().display().to_string());
        }
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run helm attached to the current terminal.
    pub fn run(&self) -> Result<()> {
        info!("exec: {} {}", self.bin, self.args.join(" "));
        run_inherited(&self.bin, &self.args)?;
        Ok(())
    }
}

/// Get Helm version if available.
pub fn helm_version(bin: &str) -> Option<String> {
    execute_command(bin, &["version", "--short"])
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}
