use crate::domain::Version;
use crate::error::{ReleaseError, Result};

/// Tag naming pattern (e.g., "v{version}", "release-{version}")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    pub pattern: String,
}

impl TagPattern {
    /// Create a new tag pattern, rejecting patterns without a `{version}` placeholder
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if pattern.matches("{version}").count() != 1 {
            return Err(ReleaseError::tag(format!(
                "Pattern '{}' must contain exactly one {{version}} placeholder",
                pattern
            )));
        }
        Ok(TagPattern { pattern })
    }

    /// Format a version according to pattern
    /// Example: pattern="v{version}", version=1.2.3 -> "v1.2.3"
    pub fn format(&self, version: &Version) -> String {
        self.pattern.replace("{version}", &version.to_string())
    }

    /// Extract the version from a tag that follows this pattern
    ///
    /// Returns `None` when the tag has a different prefix/suffix or the
    /// middle part is not a version.
    pub fn parse(&self, tag: &str) -> Option<Version> {
        let (prefix, suffix) = self.pattern.split_once("{version}")?;
        let middle = tag.strip_prefix(prefix)?.strip_suffix(suffix)?;
        Version::parse(middle).ok()
    }
}

impl Default for TagPattern {
    fn default() -> Self {
        TagPattern {
            pattern: "v{version}".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_format() {
        let pattern = TagPattern::default();
        assert_eq!(pattern.format(&Version::new(1, 2, 3)), "v1.2.3");
    }

    #[test]
    fn test_pattern_format_with_suffix() {
        let pattern = TagPattern::new("release-{version}-final").unwrap();
        assert_eq!(
            pattern.format(&Version::new(1, 2, 3)),
            "release-1.2.3-final"
        );
    }

    #[test]
    fn test_pattern_requires_placeholder() {
        assert!(TagPattern::new("latest").is_err());
        assert!(TagPattern::new("{version}-{version}").is_err());
    }

    #[test]
    fn test_pattern_parse() {
        let pattern = TagPattern::default();
        assert_eq!(pattern.parse("v1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(pattern.parse("release-1.2.3"), None);
        assert_eq!(pattern.parse("vnext"), None);
    }

    #[test]
    fn test_bare_pattern_parse_accepts_v_prefix() {
        let pattern = TagPattern::new("{version}").unwrap();
        assert_eq!(pattern.parse("1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(pattern.parse("v1.2.3"), Some(Version::new(1, 2, 3)));
    }
}
