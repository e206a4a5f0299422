use thiserror::Error;

/// Unified error type for git-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Rewrite error: {0}")]
    Rewrite(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Working tree has uncommitted changes; commit or stash them first")]
    DirtyWorkingTree,

    #[error("Build failed: {0}")]
    Build(String),

    #[error("GitHub release failed: {0}")]
    GitHub(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience type alias for Results in git-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::Version(msg.into())
    }

    /// Create a rewrite error with context
    pub fn rewrite(msg: impl Into<String>) -> Self {
        ReleaseError::Rewrite(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        ReleaseError::Tag(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        ReleaseError::Remote(msg.into())
    }

    /// Create a build error with context
    pub fn build(msg: impl Into<String>) -> Self {
        ReleaseError::Build(msg.into())
    }

    /// Create a GitHub publishing error with context
    pub fn github(msg: impl Into<String>) -> Self {
        ReleaseError::GitHub(msg.into())
    }
}
