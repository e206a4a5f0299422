use crate::error::{ReleaseError, Result};
use crate::git::{ChangeScope, Repository};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

/// A git operation recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Stage(Vec<PathBuf>),
    Commit(String),
    Tag(String),
    PushBranch {
        remote: String,
        local: String,
        target: String,
    },
    PushTags {
        remote: String,
        tags: Vec<String>,
    },
}

/// Mock repository for testing without actual git operations
///
/// Files live under a real directory (`root`) so rewrites can be checked,
/// while git operations are only recorded.
pub struct MockRepository {
    root: PathBuf,
    branch: String,
    tags: RefCell<Vec<String>>,
    dirty_worktree: Cell<bool>,
    staged: Cell<bool>,
    calls: RefCell<Vec<GitCall>>,
}

impl MockRepository {
    /// Create a clean mock repository rooted at `root`, on branch `main`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MockRepository {
            root: root.into(),
            branch: "main".to_string(),
            tags: RefCell::new(Vec::new()),
            dirty_worktree: Cell::new(false),
            staged: Cell::new(false),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Add an existing tag
    pub fn add_tag(&self, name: impl Into<String>) {
        self.tags.borrow_mut().push(name.into());
    }

    /// Pretend the working tree has unstaged changes
    pub fn set_dirty(&self, dirty: bool) {
        self.dirty_worktree.set(dirty);
    }

    /// Operations performed so far, in order
    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: GitCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Repository for MockRepository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.tags.borrow().clone())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.tags.borrow().iter().any(|tag| tag == name))
    }

    fn is_clean(&self, scope: ChangeScope) -> Result<bool> {
        Ok(match scope {
            ChangeScope::WorkingTree => !self.dirty_worktree.get(),
            ChangeScope::Staged => !self.staged.get(),
        })
    }

    fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        if !paths.is_empty() {
            self.staged.set(true);
        }
        self.record(GitCall::Stage(paths.to_vec()));
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.staged.set(false);
        self.record(GitCall::Commit(message.to_string()));
        Ok(format!("{:040}", self.calls.borrow().len()))
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        if self.tag_exists(name)? {
            return Err(ReleaseError::tag(format!("Tag '{}' already exists", name)));
        }
        self.tags.borrow_mut().push(name.to_string());
        self.record(GitCall::Tag(name.to_string()));
        Ok(())
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn push_branch(&self, remote: &str, local_branch: &str, remote_branch: &str) -> Result<()> {
        self.record(GitCall::PushBranch {
            remote: remote.to_string(),
            local: local_branch.to_string(),
            target: remote_branch.to_string(),
        });
        Ok(())
    }

    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()> {
        self.record(GitCall::PushTags {
            remote: remote.to_string(),
            tags: tag_names.iter().map(|t| t.to_string()).collect(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_tags() {
        let repo = MockRepository::new("/tmp/project");
        repo.add_tag("v1.0.0");

        assert!(repo.tag_exists("v1.0.0").unwrap());
        assert!(!repo.tag_exists("v2.0.0").unwrap());
        assert!(repo.create_tag("v1.0.0").is_err());
    }

    #[test]
    fn test_mock_repository_staging_cycle() {
        let repo = MockRepository::new("/tmp/project");
        assert!(repo.is_clean(ChangeScope::Staged).unwrap());

        repo.stage(&[PathBuf::from("VERSION")]).unwrap();
        assert!(!repo.is_clean(ChangeScope::Staged).unwrap());

        repo.commit("Version 1.0.0").unwrap();
        assert!(repo.is_clean(ChangeScope::Staged).unwrap());
        assert_eq!(
            repo.calls(),
            vec![
                GitCall::Stage(vec![PathBuf::from("VERSION")]),
                GitCall::Commit("Version 1.0.0".to_string()),
            ]
        );
    }

    #[test]
    fn test_mock_repository_dirty_flag() {
        let repo = MockRepository::new("/tmp/project");
        repo.set_dirty(true);
        assert!(!repo.is_clean(ChangeScope::WorkingTree).unwrap());
    }
}
