//! Git operations abstraction layer
//!
//! The release workflow talks to git only through the [Repository] trait, so
//! it can run against a real repository ([repository::Git2Repository]) or a
//! recording fake ([mock::MockRepository]) in tests.
//!
//! ```rust
//! # use git_release::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> git_release::Result<()> {
//! repo.stage(&["setup.py".into()])?;
//! repo.commit("Version 1.2.3")?;
//! repo.create_tag("v1.2.3")?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Which side of the index to compare when checking for changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeScope {
    /// Tracked files in the working tree compared with the index
    WorkingTree,
    /// The index compared with HEAD
    Staged,
}

/// Common git operation trait for abstraction
///
/// All methods return [crate::error::Result<T>]; implementations map their
/// underlying errors to [crate::error::ReleaseError] variants.
pub trait Repository {
    /// Root of the working tree
    fn root(&self) -> &Path;

    /// All tag names in the repository
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Whether a tag with this name exists
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// `true` when there are no changes in the given scope. Untracked files are ignored.
    fn is_clean(&self, scope: ChangeScope) -> Result<bool>;

    /// Add files (relative to [Repository::root]) to the index
    fn stage(&self, paths: &[PathBuf]) -> Result<()>;

    /// Commit the index on top of HEAD, returning the new commit id
    fn commit(&self, message: &str) -> Result<String>;

    /// Create a lightweight tag on HEAD
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Short name of the checked out branch
    fn current_branch(&self) -> Result<String>;

    /// Push a local branch to `remote_branch` on `remote`
    fn push_branch(&self, remote: &str, local_branch: &str, remote_branch: &str) -> Result<()>;

    /// Push tags to a remote
    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()>;
}
