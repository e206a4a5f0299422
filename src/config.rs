use crate::domain::TagPattern;
use crate::error::{ReleaseError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Name of the capture group that marks the version inside a pattern.
pub const RELEASE_GROUP: &str = "release";

/// Complete release configuration, loaded from a YAML file.
///
/// The first entry of `version_strings` is the one the current version is read from.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    pub version_strings: Vec<VersionLocation>,

    #[serde(default)]
    pub github: Option<GitHubConfig>,

    #[serde(default)]
    pub git_release: Option<GitReleaseConfig>,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_tag_format")]
    pub tag_format: String,

    #[serde(default)]
    pub build: BuildConfig,
}

/// A file holding a version string and the regex that locates it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersionLocation {
    pub path: PathBuf,
    pub pattern: String,

    /// Leave this file alone when bumping to the next alpha
    #[serde(default)]
    pub skip_alpha: bool,
}

impl VersionLocation {
    /// Drop `.` components so `./setup.py` names the same index entry as `setup.py`
    pub fn normalize_path(&mut self) {
        self.path = self
            .path
            .components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect();
    }

    /// The path must stay inside the repository: relative, without `..`
    pub fn check_path(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(ReleaseError::config("version_strings entry has an empty path"));
        }

        let escapes = self.path.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes {
            return Err(ReleaseError::config(format!(
                "Path '{}' must be relative to the repository root and must not contain '..'",
                self.path.display()
            )));
        }

        Ok(())
    }

    /// Compile the pattern, checking it exposes the `release` group
    pub fn regex(&self) -> Result<Regex> {
        let regex = Regex::new(&self.pattern).map_err(|e| {
            ReleaseError::config(format!(
                "Invalid pattern for '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        if !regex.capture_names().flatten().any(|name| name == RELEASE_GROUP) {
            return Err(ReleaseError::config(format!(
                "Pattern for '{}' has no (?P<{}>...) group",
                self.path.display(),
                RELEASE_GROUP
            )));
        }

        Ok(regex)
    }
}

/// GitHub release publishing settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitHubConfig {
    pub user: String,
    pub repo: String,

    /// File holding the API token, relative to the repository root.
    /// Falls back to GH_TOKEN / GITHUB_TOKEN when absent.
    #[serde(default)]
    pub token: Option<PathBuf>,

    #[serde(default)]
    pub assets: Vec<AssetConfig>,

    #[serde(default = "default_api_url")]
    pub api_url: String,
}

/// A file attached to the GitHub release.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AssetConfig {
    pub path: PathBuf,

    #[serde(rename = "type")]
    pub content_type: String,
}

/// Extra push of the released commit to a mirror branch.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitReleaseConfig {
    pub remote: String,
    pub branch: String,
}

/// Build commands, run from the repository root. An empty command is skipped.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BuildConfig {
    #[serde(default = "default_clean_command")]
    pub clean: Vec<String>,

    #[serde(default = "default_build_command")]
    pub build: Vec<String>,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_tag_format() -> String {
    "v{version}".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_clean_command() -> Vec<String> {
    vec!["make".to_string(), "clean".to_string()]
}

fn default_build_command() -> Vec<String> {
    vec!["make".to_string()]
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            clean: default_clean_command(),
            build: default_build_command(),
        }
    }
}

impl ReleaseConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: ReleaseConfig = serde_yaml::from_str(yaml)?;
        for location in &mut config.version_strings {
            location.normalize_path();
        }
        config.validate()?;
        Ok(config)
    }

    /// The location the current version is read from
    pub fn primary_location(&self) -> Result<&VersionLocation> {
        self.version_strings
            .first()
            .ok_or_else(|| ReleaseError::config("version_strings must not be empty"))
    }

    /// Tag naming pattern built from `tag_format`
    pub fn tag_pattern(&self) -> Result<TagPattern> {
        TagPattern::new(self.tag_format.as_str())
            .map_err(|e| ReleaseError::config(format!("Invalid tag_format: {}", e)))
    }

    /// Check everything that can be checked before touching the repository
    pub fn validate(&self) -> Result<()> {
        self.primary_location()?;

        for location in &self.version_strings {
            location.check_path()?;
            location.regex()?;
        }

        self.tag_pattern()?;

        if self.remote.trim().is_empty() {
            return Err(ReleaseError::config("remote must not be empty"));
        }

        if let Some(github) = &self.github {
            if github.user.trim().is_empty() || github.repo.trim().is_empty() {
                return Err(ReleaseError::config("github.user and github.repo are required"));
            }
            for asset in &github.assets {
                if asset.content_type.trim().is_empty() {
                    return Err(ReleaseError::config(format!(
                        "Asset '{}' has no type",
                        asset.path.display()
                    )));
                }
            }
        }

        if let Some(mirror) = &self.git_release {
            if mirror.remote.trim().is_empty() || mirror.branch.trim().is_empty() {
                return Err(ReleaseError::config(
                    "git_release.remote and git_release.branch are required",
                ));
            }
        }

        Ok(())
    }
}

/// Loads and validates the release configuration file.
///
/// # Arguments
/// * `config_path` - Path to the YAML configuration file
///
/// # Returns
/// * `Ok(ReleaseConfig)` - Parsed, validated configuration
/// * `Err` - If the file cannot be read, parsed or fails validation
pub fn load_config(config_path: impl AsRef<Path>) -> Result<ReleaseConfig> {
    let path = config_path.as_ref();
    let config_str = fs::read_to_string(path).map_err(|e| {
        ReleaseError::config(format!("Cannot read '{}': {}", path.display(), e))
    })?;

    log::debug!("Loaded configuration from {}", path.display());
    ReleaseConfig::from_yaml(&config_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
version_strings:
  - path: setup.py
    pattern: 'version="(?P<release>[^"]+)"'
"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = ReleaseConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.version_strings.len(), 1);
        assert!(!config.version_strings[0].skip_alpha);
        assert_eq!(config.remote, "origin");
        assert_eq!(config.tag_format, "v{version}");
        assert_eq!(config.build, BuildConfig::default());
        assert!(config.github.is_none());
        assert!(config.git_release.is_none());
    }

    #[test]
    fn test_github_block() {
        let yaml = r#"
version_strings:
  - path: setup.py
    pattern: 'version="(?P<release>[^"]+)"'
github:
  user: octo
  repo: widget
  token: .github_token
  assets:
    - path: dist/widget.tar.gz
      type: application/gzip
"#;
        let config = ReleaseConfig::from_yaml(yaml).unwrap();
        let github = config.github.unwrap();
        assert_eq!(github.user, "octo");
        assert_eq!(github.token, Some(PathBuf::from(".github_token")));
        assert_eq!(github.api_url, "https://api.github.com");
        assert_eq!(github.assets[0].content_type, "application/gzip");
    }

    #[test]
    fn test_empty_version_strings_rejected() {
        let err = ReleaseConfig::from_yaml("version_strings: []").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_missing_version_strings_rejected() {
        assert!(ReleaseConfig::from_yaml("remote: origin").is_err());
    }

    #[test]
    fn test_pattern_without_release_group_rejected() {
        let yaml = r#"
version_strings:
  - path: setup.py
    pattern: 'version="([^"]+)"'
"#;
        let err = ReleaseConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("release"));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let yaml = r#"
version_strings:
  - path: setup.py
    pattern: '(?P<release>[unclosed'
"#;
        assert!(ReleaseConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_tag_format_without_placeholder_rejected() {
        let yaml = format!("{}tag_format: latest\n", MINIMAL);
        let err = ReleaseConfig::from_yaml(&yaml).unwrap_err();
        assert!(err.to_string().contains("tag_format"));
    }

    #[test]
    fn test_dot_slash_path_is_normalized() {
        let yaml = r#"
version_strings:
  - path: ./src/./widget/__init__.py
    pattern: '__version__ = "(?P<release>[^"]+)"'
"#;
        let config = ReleaseConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.version_strings[0].path,
            PathBuf::from("src/widget/__init__.py")
        );
    }

    #[test]
    fn test_paths_outside_repository_rejected() {
        for path in ["../setup.py", "/etc/setup.py", "src/../../setup.py", "./"] {
            let yaml = format!(
                "version_strings:\n  - path: {}\n    pattern: 'v=(?P<release>.+)'\n",
                path
            );
            assert!(
                ReleaseConfig::from_yaml(&yaml).is_err(),
                "'{}' should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_build_override() {
        let yaml = format!("{}build:\n  clean: []\n  build: [cargo, build]\n", MINIMAL);
        let config = ReleaseConfig::from_yaml(&yaml).unwrap();
        assert!(config.build.clean.is_empty());
        assert_eq!(config.build.build, vec!["cargo", "build"]);
    }
}
