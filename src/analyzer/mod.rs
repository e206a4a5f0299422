//! Reading and checking versions before anything is changed

pub mod validator;
pub mod version_reader;

pub use validator::validate_versions;
pub use version_reader::{VersionReader, VersionState};
