use crate::error::{ReleaseError, Result};
use crate::git::ChangeScope;
use git2::{Cred, CredentialType, Repository as Git2Repo, Status, StatusOptions};
use std::cell::Cell;
use std::path::{Path, PathBuf};

/// libgit2 keeps asking for credentials while authentication fails
const MAX_CREDENTIAL_ATTEMPTS: u32 = 4;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    root: PathBuf,
}

impl Git2Repository {
    /// Open the repository containing `path` (searching parent directories)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Self::from_git2(repo)
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Result<Self> {
        let root = repo
            .workdir()
            .ok_or_else(|| ReleaseError::config("Cannot release from a bare repository"))?
            .to_path_buf();

        Ok(Git2Repository { repo, root })
    }

    fn push_refspecs(&self, remote_name: &str, refspecs: &[String]) -> Result<()> {
        let mut remote = self.repo.find_remote(remote_name).map_err(|e| {
            ReleaseError::remote(format!("Cannot find remote '{}': {}", remote_name, e))
        })?;
        let config = self.repo.config()?;
        let attempts = Cell::new(0);

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|url, username_from_url, allowed_types| {
            attempts.set(attempts.get() + 1);
            if attempts.get() > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str("authentication failed"));
            }
            credentials(&config, url, username_from_url, allowed_types)
        });

        // The remote may refuse single references even when the push succeeds
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => {
                log::warn!("Could not update reference {}: {}", refname, status);
                Err(git2::Error::from_str(&format!("Push rejected for {}", refname)))
            }
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let specs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
        log::debug!("Pushing {:?} to {}", specs, remote_name);

        remote
            .push(&specs, Some(&mut push_options))
            .map_err(|e| match e.class() {
                git2::ErrorClass::Net => ReleaseError::remote(format!(
                    "Network error pushing to '{}': {}",
                    remote_name, e
                )),
                _ => ReleaseError::remote(format!("Push to '{}' failed: {}", remote_name, e)),
            })
    }
}

/// Resolve credentials: SSH keys from ~/.ssh, the SSH agent, then git's credential helpers.
fn credentials(
    config: &git2::Config,
    url: &str,
    username_from_url: Option<&str>,
    allowed_types: CredentialType,
) -> std::result::Result<Cred, git2::Error> {
    let username = username_from_url.unwrap_or("git");

    if allowed_types.contains(CredentialType::SSH_KEY) {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
            let path = Path::new(&home).join(".ssh").join(key);
            if path.exists() {
                if let Ok(cred) = Cred::ssh_key(username, None, &path, None) {
                    return Ok(cred);
                }
            }
        }

        if let Ok(cred) = Cred::ssh_key_from_agent(username) {
            return Ok(cred);
        }
    }

    if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
        if let Ok(cred) = Cred::credential_helper(config, url, username_from_url) {
            return Ok(cred);
        }
    }

    if allowed_types.contains(CredentialType::USERNAME) {
        return Cred::username(username);
    }

    Cred::default()
}

impl super::Repository for Git2Repository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(ReleaseError::tag(format!("Cannot look up tag '{}': {}", name, e))),
        }
    }

    fn is_clean(&self, scope: ChangeScope) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);

        let mask = match scope {
            ChangeScope::WorkingTree => {
                Status::WT_MODIFIED | Status::WT_DELETED | Status::WT_TYPECHANGE | Status::WT_RENAMED
            }
            ChangeScope::Staged => {
                Status::INDEX_NEW
                    | Status::INDEX_MODIFIED
                    | Status::INDEX_DELETED
                    | Status::INDEX_RENAMED
                    | Status::INDEX_TYPECHANGE
            }
        };

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(!statuses.iter().any(|entry| entry.status().intersects(mask)))
    }

    fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        let mut index = self.repo.index()?;
        for path in paths {
            index.add_path(path)?;
        }
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;
        let parent = self.repo.head()?.peel_to_commit()?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;

        log::debug!("Committed {} ({})", oid, message);
        Ok(oid.to_string())
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        self.repo
            .tag_lightweight(name, head.as_object(), false)
            .map_err(|e| ReleaseError::tag(format!("Cannot create tag '{}': {}", name, e)))?;
        Ok(())
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(ReleaseError::remote("HEAD is detached; check out a branch first"));
        }

        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| ReleaseError::remote("Branch name is not valid UTF-8"))
    }

    fn push_branch(&self, remote: &str, local_branch: &str, remote_branch: &str) -> Result<()> {
        let refspec = format!("refs/heads/{}:refs/heads/{}", local_branch, remote_branch);
        self.push_refspecs(remote, &[refspec])
    }

    fn push_tags(&self, remote: &str, tag_names: &[&str]) -> Result<()> {
        let refspecs: Vec<String> = tag_names
            .iter()
            .map(|tag| format!("refs/tags/{}:refs/tags/{}", tag, tag))
            .collect();
        self.push_refspecs(remote, &refspecs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use std::fs;
    use tempfile::TempDir;

    fn init_repo() -> (TempDir, Git2Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        fs::write(dir.path().join("VERSION"), "version = \"0.1.0\"\n").unwrap();
        {
            let mut index = repo.index().unwrap();
            index.add_path(Path::new("VERSION")).unwrap();
            index.write().unwrap();
            let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
            let sig = repo.signature().unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
                .unwrap();
        }
        let repo = Git2Repository::from_git2(repo).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_bare_repository_rejected() {
        let dir = TempDir::new().unwrap();
        let bare = Git2Repo::init_bare(dir.path()).unwrap();
        assert!(Git2Repository::from_git2(bare).is_err());
    }

    #[test]
    fn test_clean_scopes() {
        let (dir, repo) = init_repo();
        assert!(repo.is_clean(ChangeScope::WorkingTree).unwrap());
        assert!(repo.is_clean(ChangeScope::Staged).unwrap());

        fs::write(dir.path().join("VERSION"), "version = \"0.2.0\"\n").unwrap();
        assert!(!repo.is_clean(ChangeScope::WorkingTree).unwrap());

        repo.stage(&[PathBuf::from("VERSION")]).unwrap();
        assert!(repo.is_clean(ChangeScope::WorkingTree).unwrap());
        assert!(!repo.is_clean(ChangeScope::Staged).unwrap());
    }

    #[test]
    fn test_untracked_files_do_not_count() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("notes.txt"), "scratch").unwrap();
        assert!(repo.is_clean(ChangeScope::WorkingTree).unwrap());
    }

    #[test]
    fn test_commit_and_tag() {
        let (dir, repo) = init_repo();
        fs::write(dir.path().join("VERSION"), "version = \"0.2.0\"\n").unwrap();
        repo.stage(&[PathBuf::from("VERSION")]).unwrap();

        let id = repo.commit("Version 0.2.0").unwrap();
        assert_eq!(id.len(), 40);
        assert!(repo.is_clean(ChangeScope::Staged).unwrap());

        assert!(!repo.tag_exists("v0.2.0").unwrap());
        repo.create_tag("v0.2.0").unwrap();
        assert!(repo.tag_exists("v0.2.0").unwrap());
        assert_eq!(repo.list_tags().unwrap(), vec!["v0.2.0".to_string()]);

        assert!(repo.create_tag("v0.2.0").is_err());
    }

    #[test]
    fn test_push_to_unknown_remote_fails() {
        let (_dir, repo) = init_repo();
        let err = repo.push_tags("nowhere", &["v0.1.0"]).unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }
}
