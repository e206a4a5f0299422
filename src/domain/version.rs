use crate::domain::prerelease::PreRelease;
use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

const VERSION_FORMAT: &str = r"^(?P<major>\d+)\.(?P<minor>\d+)\.(?P<micro>\d+)(?P<prerelease>(?:alpha|a|beta|b)\d*)?(?:\+(?P<revision>[A-Za-z0-9]+))?$";

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_FORMAT).expect("version format regex is valid"))
}

/// Release version: `major.minor.micro[{a|b}N][+revision]`
///
/// Final releases sort above every pre-release of the same micro version.
/// When everything else is equal, a version without a revision sorts above
/// one that carries a revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub micro: u32,
    pub prerelease: Option<PreRelease>,
    pub revision: Option<String>,
}

impl Version {
    /// Create a final release version
    pub fn new(major: u32, minor: u32, micro: u32) -> Self {
        Version {
            major,
            minor,
            micro,
            prerelease: None,
            revision: None,
        }
    }

    /// Attach a pre-release marker
    pub fn with_prerelease(mut self, prerelease: PreRelease) -> Self {
        self.prerelease = Some(prerelease);
        self
    }

    /// Parse a version string, tolerating a leading `v` (e.g. "v1.2.3", "1.2.4a0")
    pub fn parse(input: &str) -> Result<Self> {
        let clean = input.trim();
        let clean = clean.strip_prefix('v').unwrap_or(clean);

        let captures = version_regex()
            .captures(clean)
            .ok_or_else(|| ReleaseError::version(format!("Invalid version: '{}'", input)))?;

        let number = |name: &str| -> Result<u32> {
            captures[name].parse::<u32>().map_err(|_| {
                ReleaseError::version(format!("Invalid {} component in '{}'", name, input))
            })
        };

        let prerelease = captures
            .name("prerelease")
            .map(|m| PreRelease::parse(m.as_str()))
            .transpose()?;

        Ok(Version {
            major: number("major")?,
            minor: number("minor")?,
            micro: number("micro")?,
            prerelease,
            revision: captures.name("revision").map(|m| m.as_str().to_string()),
        })
    }

    /// Whether this is a pre-release (alpha or beta)
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// First alpha of the next micro version: `1.2.3` -> `1.2.4a0`
    ///
    /// Fails when the micro number is already at its maximum.
    pub fn next_alpha(&self) -> Result<Self> {
        let micro = self.micro.checked_add(1).ok_or_else(|| {
            ReleaseError::version(format!("Cannot bump {} to a next micro version", self))
        })?;
        Ok(Version::new(self.major, self.minor, micro).with_prerelease(PreRelease::alpha()))
    }
}

impl FromStr for Version {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.micro)
            .cmp(&(other.major, other.minor, other.micro))
            .then_with(|| match (&self.prerelease, &other.prerelease) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
            .then_with(|| match (&self.revision, &other.revision) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
        if let Some(prerelease) = &self.prerelease {
            write!(f, "{}", prerelease)?;
        }
        if let Some(revision) = &self.revision {
            write!(f, "+{}", revision)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prerelease::PreReleaseType;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_version_parse() {
        let version = v("v1.2.3");
        assert_eq!(version.major, 1);
        assert_eq!(version.minor, 2);
        assert_eq!(version.micro, 3);
        assert!(!version.is_prerelease());
    }

    #[test]
    fn test_version_parse_prerelease_and_revision() {
        let version = v("2.0.1beta4+abc123");
        assert_eq!(
            version.prerelease,
            Some(PreRelease::new(PreReleaseType::Beta, 4))
        );
        assert_eq!(version.revision.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("v1.2.3.4").is_err());
        assert!(Version::parse("1.2.3rc1").is_err());
        assert!(Version::parse("release-1.2.3").is_err());
        assert!(Version::parse("").is_err());
    }

    #[test]
    fn test_version_display_is_canonical() {
        assert_eq!(v("v1.2.3").to_string(), "1.2.3");
        assert_eq!(v("1.2.4alpha").to_string(), "1.2.4a0");
        assert_eq!(v("1.2.4b2+r7").to_string(), "1.2.4b2+r7");
    }

    #[test]
    fn test_version_ordering_components() {
        assert!(v("1.2.3") < v("1.2.4"));
        assert!(v("1.2.9") < v("1.3.0"));
        assert!(v("1.9.9") < v("2.0.0"));
    }

    #[test]
    fn test_version_ordering_prerelease_below_final() {
        assert!(v("1.2.4a0") < v("1.2.4a1"));
        assert!(v("1.2.4a5") < v("1.2.4b0"));
        assert!(v("1.2.4b9") < v("1.2.4"));
        assert!(v("1.2.3") < v("1.2.4a0"));
    }

    #[test]
    fn test_version_ordering_revision_below_plain() {
        assert!(v("1.2.3+build") < v("1.2.3"));
        assert_eq!(v("1.2.3").cmp(&v("v1.2.3")), Ordering::Equal);
    }

    #[test]
    fn test_next_alpha() {
        assert_eq!(v("1.2.3").next_alpha().unwrap().to_string(), "1.2.4a0");
        assert_eq!(v("0.9.9b1").next_alpha().unwrap().to_string(), "0.9.10a0");
    }

    #[test]
    fn test_next_alpha_at_micro_limit() {
        let last = v("1.2.4294967295");
        assert_eq!(last.micro, u32::MAX);
        assert!(matches!(last.next_alpha(), Err(ReleaseError::Version(_))));
    }
}
