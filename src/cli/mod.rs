//! Programmatic entry point for the release run; main.rs only parses arguments
//! and wires up the real repository, build runner and publisher.

pub mod orchestration;

pub use orchestration::{run_release_workflow, ReleaseWorkflow, ReleaseWorkflowArgs, WorkflowResult};
