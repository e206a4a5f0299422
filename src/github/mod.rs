//! Publishing the pushed tag as a GitHub release
//!
//! The workflow only sees the [ReleasePublisher] trait. When the
//! configuration has no `github` block no publisher is built at all, so a
//! release never touches the network beyond `git push`.

pub mod client;

pub use client::GitHubPublisher;

use crate::config::AssetConfig;
use crate::error::{ReleaseError, Result};
use std::path::{Path, PathBuf};

/// A file to attach to a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// Absolute path of the file
    pub path: PathBuf,
    /// Asset name on the release (the file name)
    pub name: String,
    /// MIME type sent as Content-Type
    pub content_type: String,
}

impl ReleaseAsset {
    /// Resolve a configured asset against the repository root
    pub fn from_config(root: &Path, asset: &AssetConfig) -> Result<Self> {
        let name = asset
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ReleaseError::config(format!("Invalid asset path: '{}'", asset.path.display()))
            })?
            .to_string();

        Ok(ReleaseAsset {
            path: root.join(&asset.path),
            name,
            content_type: asset.content_type.clone(),
        })
    }
}

/// Outcome of publishing a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedRelease {
    pub id: u64,
    pub html_url: String,
    /// Download URLs of the uploaded assets
    pub uploaded: Vec<String>,
}

/// Turns a pushed tag into a hosted release
pub trait ReleasePublisher {
    fn publish(&self, tag: &str, assets: &[ReleaseAsset]) -> Result<PublishedRelease>;
}
