//! Project build step, run between tagging and pushing
//!
//! A failed build stops the release before anything reaches the remote.

pub mod executor;

pub use executor::CommandExecutor;

use crate::error::Result;
use std::path::Path;

/// Something that builds the project from the repository root
pub trait BuildRunner {
    fn run(&self, root: &Path) -> Result<()>;
}
