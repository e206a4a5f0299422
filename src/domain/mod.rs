//! Domain logic - pure version rules independent of git operations

pub mod prerelease;
pub mod tag;
pub mod version;

pub use prerelease::{PreRelease, PreReleaseType};
pub use tag::TagPattern;
pub use version::Version;
