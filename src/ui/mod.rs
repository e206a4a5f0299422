//! User interface module.
//!
//! The release run is non-interactive, so this is all output: `formatter`
//! holds the styled messages shown while a release progresses.

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_error, display_plan, display_published, display_rewrites,
    display_status, display_success, display_versions,
};
