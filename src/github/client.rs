use crate::config::GitHubConfig;
use crate::error::{ReleaseError, Result};
use crate::github::{PublishedRelease, ReleaseAsset, ReleasePublisher};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

const USER_AGENT: &str = concat!("git-release/", env!("CARGO_PKG_VERSION"));

/// Release object as returned by the GitHub REST API
#[derive(Deserialize, Debug, Clone)]
pub struct GitHubRelease {
    pub id: u64,
    pub tag_name: String,
    pub html_url: String,
    pub upload_url: String,
}

/// Uploaded asset as returned by the GitHub REST API
#[derive(Deserialize, Debug, Clone)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Blocking GitHub REST client for one repository
pub struct GitHubPublisher {
    agent: ureq::Agent,
    api_url: String,
    user: String,
    repo: String,
    token: String,
}

impl GitHubPublisher {
    /// Create a publisher, reading the token from the configured file or the environment
    pub fn new(config: &GitHubConfig, root: &Path) -> Result<Self> {
        let token = resolve_token(config.token.as_deref(), root, |key| std::env::var(key).ok())?;

        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(600)))
            .build();

        Ok(GitHubPublisher {
            agent: ureq::Agent::new_with_config(agent_config),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            user: config.user.clone(),
            repo: config.repo.clone(),
            token,
        })
    }

    /// `{api}/repos/{user}/{repo}/releases`
    pub fn releases_url(&self) -> String {
        format!("{}/repos/{}/{}/releases", self.api_url, self.user, self.repo)
    }

    /// `{api}/repos/{user}/{repo}/releases/tags/{tag}` with the tag as one encoded segment
    pub fn release_by_tag_url(&self, tag: &str) -> Result<String> {
        let releases = self.releases_url();
        let mut url = url::Url::parse(&releases)
            .map_err(|e| ReleaseError::github(format!("Invalid API URL '{}': {}", releases, e)))?;
        url.path_segments_mut()
            .map_err(|_| ReleaseError::github(format!("Invalid API URL '{}'", releases)))?
            .push("tags")
            .push(tag);
        Ok(url.to_string())
    }

    fn authorization(&self) -> String {
        format!("token {}", self.token)
    }

    /// Look up the release for a tag; `None` when GitHub answers 404
    pub fn find_release(&self, tag: &str) -> Result<Option<GitHubRelease>> {
        let url = self.release_by_tag_url(tag)?;
        log::debug!("GET {}", url);

        let response = self
            .agent
            .get(url.as_str())
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("Authorization", self.authorization())
            .call();

        match response {
            Ok(mut response) => {
                let release = response
                    .body_mut()
                    .read_json::<GitHubRelease>()
                    .map_err(|e| http_error("reading release", e))?;
                Ok(Some(release))
            }
            Err(ureq::Error::StatusCode(404)) => Ok(None),
            Err(e) => Err(http_error(&format!("looking up release {}", tag), e)),
        }
    }

    /// Create a release for an already pushed tag
    pub fn create_release(&self, tag: &str) -> Result<GitHubRelease> {
        let url = self.releases_url();
        log::debug!("POST {}", url);

        let mut response = self
            .agent
            .post(url.as_str())
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("Authorization", self.authorization())
            .send_json(serde_json::json!({ "tag_name": tag }))
            .map_err(|e| http_error(&format!("creating release {}", tag), e))?;

        response
            .body_mut()
            .read_json::<GitHubRelease>()
            .map_err(|e| http_error("reading created release", e))
    }

    /// Upload one asset, returning its download URL
    pub fn upload_asset(&self, release: &GitHubRelease, asset: &ReleaseAsset) -> Result<String> {
        let data = fs::read(&asset.path).map_err(|e| {
            ReleaseError::github(format!("Cannot read asset '{}': {}", asset.path.display(), e))
        })?;
        let url = expand_upload_url(&release.upload_url, &asset.name)?;
        log::debug!("POST {} ({} bytes, {})", url, data.len(), asset.content_type);

        let mut response = self
            .agent
            .post(url.as_str())
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("Authorization", self.authorization())
            .header("Content-Type", asset.content_type.as_str())
            .send(data.as_slice())
            .map_err(|e| http_error(&format!("uploading {}", asset.name), e))?;

        let uploaded = response
            .body_mut()
            .read_json::<GitHubAsset>()
            .map_err(|e| http_error("reading uploaded asset", e))?;
        log::info!("Uploaded {}", uploaded.name);

        Ok(uploaded.browser_download_url)
    }
}

impl ReleasePublisher for GitHubPublisher {
    fn publish(&self, tag: &str, assets: &[ReleaseAsset]) -> Result<PublishedRelease> {
        let release = match self.find_release(tag)? {
            Some(existing) => {
                log::info!("Release for {} already exists", existing.tag_name);
                existing
            }
            None => self.create_release(tag)?,
        };

        let uploaded = assets
            .iter()
            .map(|asset| self.upload_asset(&release, asset))
            .collect::<Result<Vec<_>>>()?;

        Ok(PublishedRelease {
            id: release.id,
            html_url: release.html_url,
            uploaded,
        })
    }
}

fn http_error(action: &str, error: ureq::Error) -> ReleaseError {
    match error {
        ureq::Error::StatusCode(code) => {
            ReleaseError::github(format!("{}: HTTP status {}", action, code))
        }
        other => ReleaseError::github(format!("{}: {}", action, other)),
    }
}

/// Read the API token from `token_file` (relative to `root`), falling back
/// to the GH_TOKEN and GITHUB_TOKEN variables.
pub fn resolve_token<F>(token_file: Option<&Path>, root: &Path, env: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let token = match token_file {
        Some(file) => {
            let path = root.join(file);
            fs::read_to_string(&path).map_err(|e| {
                ReleaseError::config(format!("Cannot read token file '{}': {}", path.display(), e))
            })?
        }
        None => env("GH_TOKEN")
            .or_else(|| env("GITHUB_TOKEN"))
            .ok_or_else(|| {
                ReleaseError::config(
                    "No GitHub token: set github.token or the GH_TOKEN / GITHUB_TOKEN variable",
                )
            })?,
    };

    let token = token.trim();
    if token.is_empty() {
        return Err(ReleaseError::config("GitHub token is empty"));
    }
    Ok(token.to_string())
}

/// Expand a release `upload_url` template (`.../assets{?name,label}`) for one file
pub fn expand_upload_url(template: &str, name: &str) -> Result<String> {
    let base = template.split('{').next().unwrap_or(template);
    let mut url = url::Url::parse(base)
        .map_err(|e| ReleaseError::github(format!("Invalid upload URL '{}': {}", template, e)))?;
    url.query_pairs_mut().append_pair("name", name);
    Ok(url.to_string())
}
