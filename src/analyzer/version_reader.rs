use crate::boundary::BoundaryWarning;
use crate::config::VersionLocation;
use crate::domain::{TagPattern, Version};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::rewriter;

/// Versions known before a release starts
#[derive(Debug, Clone, PartialEq)]
pub struct VersionState {
    /// Name of the newest version tag
    pub latest_tag: String,
    /// Version carried by that tag
    pub latest_version: Version,
    /// Version recorded in the primary version file
    pub current: Version,
    /// Tags that were ignored
    pub warnings: Vec<BoundaryWarning>,
}

/// Reads the latest tagged version and the version recorded in the working tree
pub struct VersionReader<'a, R: Repository> {
    repo: &'a R,
    tag_pattern: &'a TagPattern,
}

impl<'a, R: Repository> VersionReader<'a, R> {
    /// Create a new version reader
    pub fn new(repo: &'a R, tag_pattern: &'a TagPattern) -> Self {
        VersionReader { repo, tag_pattern }
    }

    /// Version of a tag name: the configured pattern first, then a bare `[v]X.Y.Z`
    pub fn tag_version(&self, tag: &str) -> Option<Version> {
        self.tag_pattern
            .parse(tag)
            .or_else(|| Version::parse(tag).ok())
    }

    /// Highest version among all tags
    ///
    /// Fails when no tag carries a version.
    pub fn latest_tag(&self) -> Result<(String, Version, Vec<BoundaryWarning>)> {
        let mut warnings = Vec::new();
        let mut newest: Option<(String, Version)> = None;

        for tag in self.repo.list_tags()? {
            let Some(version) = self.tag_version(&tag) else {
                warnings.push(BoundaryWarning::UnparsableTag { tag });
                continue;
            };

            let is_newer = newest
                .as_ref()
                .map_or(true, |(_, best)| version > *best);
            if is_newer {
                newest = Some((tag, version));
            }
        }

        let (tag, version) = newest.ok_or_else(|| {
            ReleaseError::version("No version tags found; tag the previous release first")
        })?;
        log::debug!("Latest version tag: {} ({})", tag, version);

        Ok((tag, version, warnings))
    }

    /// Version recorded at `location`
    pub fn current_version(&self, location: &VersionLocation) -> Result<Version> {
        let pattern = location.regex()?;
        rewriter::find_version(&self.repo.root().join(&location.path), &pattern)
    }

    /// Latest tag plus the version in the primary file
    pub fn read(&self, primary: &VersionLocation) -> Result<VersionState> {
        let (latest_tag, latest_version, warnings) = self.latest_tag()?;
        let current = self.current_version(primary)?;

        Ok(VersionState {
            latest_tag,
            latest_version,
            current,
            warnings,
        })
    }
}
