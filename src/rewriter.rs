//! Version string rewriting in tracked files.
//!
//! Each configured file is scanned line by line. On every line where the
//! pattern matches, the `release` capture of the first match is replaced and
//! the rest of the line is kept byte for byte. All files are read and checked
//! before any of them is written.

use crate::config::{VersionLocation, RELEASE_GROUP};
use crate::domain::Version;
use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Result of rewriting one file's contents in memory
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRewrite {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Path as configured, relative to the repository root
    pub relative_path: PathBuf,
    original: String,
    updated: String,
    /// Number of lines where the pattern matched
    pub matches: usize,
}

impl PendingRewrite {
    /// Whether writing would change the file
    pub fn changes_file(&self) -> bool {
        self.original != self.updated
    }

    /// New file contents
    pub fn updated(&self) -> &str {
        &self.updated
    }

    /// Write the new contents in place, keeping the file's permissions.
    ///
    /// The content goes to a temporary file next to the target which is then
    /// renamed over it. Unchanged files are not touched.
    pub fn write(&self) -> Result<()> {
        if !self.changes_file() {
            log::debug!("{} already up to date", self.path.display());
            return Ok(());
        }

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let permissions = fs::metadata(&self.path)?.permissions();

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(self.updated.as_bytes())?;
        tmp.flush()?;
        fs::set_permissions(tmp.path(), permissions)?;
        tmp.persist(&self.path).map_err(|e| {
            ReleaseError::rewrite(format!("Cannot replace '{}': {}", self.path.display(), e))
        })?;

        log::debug!("Rewrote {}", self.path.display());
        Ok(())
    }
}

/// Replace the `release` group on every matching line.
///
/// Returns the new text and the number of lines that matched.
pub fn replace_in_text(text: &str, pattern: &Regex, replacement: &str) -> (String, usize) {
    let mut output = String::with_capacity(text.len());
    let mut matches = 0;

    for line in text.split_inclusive('\n') {
        // Match without the line ending so `$` anchors at the end of the line
        let body = line.trim_end_matches(&['\r', '\n'][..]);
        match pattern
            .captures(body)
            .and_then(|captures| captures.name(RELEASE_GROUP))
        {
            Some(group) => {
                matches += 1;
                output.push_str(&line[..group.start()]);
                output.push_str(replacement);
                output.push_str(&line[group.end()..]);
            }
            None => output.push_str(line),
        }
    }

    (output, matches)
}

/// Find the version recorded in a file: the `release` group of the first matching line.
pub fn find_version(path: &Path, pattern: &Regex) -> Result<Version> {
    let content = fs::read_to_string(path).map_err(|e| {
        ReleaseError::rewrite(format!("Cannot read '{}': {}", path.display(), e))
    })?;

    let found = content
        .lines()
        .find_map(|line| pattern.captures(line)?.name(RELEASE_GROUP))
        .ok_or_else(|| {
            ReleaseError::rewrite(format!(
                "Pattern '{}' not found in '{}'",
                pattern.as_str(),
                path.display()
            ))
        })?;

    Version::parse(found.as_str())
}

/// Compute the rewrite of one configured location
pub fn prepare_rewrite(
    root: &Path,
    location: &VersionLocation,
    version: &Version,
) -> Result<PendingRewrite> {
    let path = root.join(&location.path);
    let pattern = location.regex()?;
    let original = fs::read_to_string(&path).map_err(|e| {
        ReleaseError::rewrite(format!("Cannot read '{}': {}", path.display(), e))
    })?;

    let (updated, matches) = replace_in_text(&original, &pattern, &version.to_string());
    if matches == 0 {
        return Err(ReleaseError::rewrite(format!(
            "Pattern '{}' not found in '{}'",
            location.pattern,
            location.path.display()
        )));
    }

    Ok(PendingRewrite {
        path,
        relative_path: location.path.clone(),
        original,
        updated,
        matches,
    })
}

/// Rewrite the version in every location.
///
/// Nothing is written unless every file contains a match.
pub fn rewrite_versions<'a, I>(root: &Path, locations: I, version: &Version) -> Result<Vec<PendingRewrite>>
where
    I: IntoIterator<Item = &'a VersionLocation>,
{
    let rewrites = locations
        .into_iter()
        .map(|location| prepare_rewrite(root, location, version))
        .collect::<Result<Vec<_>>>()?;

    for rewrite in &rewrites {
        rewrite.write()?;
    }

    Ok(rewrites)
}
