use crate::build::BuildRunner;
use crate::config::BuildConfig;
use crate::error::{ReleaseError, Result};
use std::path::Path;
use std::process::Command;

/// Runs the configured clean and build commands as child processes
#[derive(Debug, Clone, PartialEq)]
pub struct CommandExecutor {
    steps: Vec<Vec<String>>,
}

impl CommandExecutor {
    /// Build the step list from configuration; empty commands are dropped
    pub fn from_config(config: &BuildConfig) -> Self {
        let steps = [&config.clean, &config.build]
            .into_iter()
            .filter(|argv| !argv.is_empty())
            .cloned()
            .collect();
        CommandExecutor { steps }
    }

    /// Commands that will run, in order
    pub fn steps(&self) -> &[Vec<String>] {
        &self.steps
    }

    /// Execute a single command in `root`
    ///
    /// Output goes straight to the terminal. Any non-zero exit code is a failure.
    pub fn execute(argv: &[String], root: &Path) -> Result<()> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ReleaseError::build("Empty build command"))?;
        let display = argv.join(" ");

        log::info!("Running `{}` in {}", display, root.display());
        let status = Command::new(program)
            .args(args)
            .current_dir(root)
            .status()
            .map_err(|e| ReleaseError::build(format!("Failed to start `{}`: {}", display, e)))?;

        if !status.success() {
            return Err(ReleaseError::build(format!(
                "`{}` exited with code {}",
                display,
                status.code().unwrap_or(-1)
            )));
        }

        Ok(())
    }
}

impl BuildRunner for CommandExecutor {
    fn run(&self, root: &Path) -> Result<()> {
        for step in &self.steps {
            Self::execute(step, root)?;
        }
        Ok(())
    }
}
