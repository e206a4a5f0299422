use std::fmt;

/// Non-fatal conditions met during a release.
/// These are reported to the user but do not stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// A tag that does not parse as a version; ignored when finding the latest release
    UnparsableTag { tag: String },
    /// The files already carry the target version, so there was nothing to commit
    NothingToCommit { version: String },
    /// A file was left out of the pre-release bump
    AlphaSkipped { path: String },
    /// The build failed after the release commit and tag were created locally
    LocalReleaseLeftBehind { tag: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::UnparsableTag { tag } => {
                write!(f, "Ignoring tag '{}': not a version", tag)
            }
            BoundaryWarning::NothingToCommit { version } => {
                write!(
                    f,
                    "Files already at version {}; no commit created",
                    version
                )
            }
            BoundaryWarning::AlphaSkipped { path } => {
                write!(f, "Skipping '{}' for the pre-release bump", path)
            }
            BoundaryWarning::LocalReleaseLeftBehind { tag } => {
                write!(
                    f,
                    "Commit and tag '{}' exist locally but were not pushed; \
                     undo with: git tag -d {} && git reset --hard HEAD~1",
                    tag, tag
                )
            }
        }
    }
}
