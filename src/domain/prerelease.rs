//! Pre-release markers for release versions
//!
//! Versions use the compact PEP 440 style markers: `a`/`alpha` and `b`/`beta`,
//! each followed by an optional number (`1.2.4a0`, `2.0.0b3`). A missing
//! number means `0`.

use crate::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// Pre-release stage. Alpha sorts before beta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreReleaseType {
    /// Alpha pre-release
    Alpha,
    /// Beta pre-release
    Beta,
}

impl PreReleaseType {
    /// Parse a pre-release stage from a string
    ///
    /// Accepts: "alpha", "a", "beta", "b" (case-insensitive)
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// Short marker written into version strings
    pub fn marker(&self) -> &'static str {
        match self {
            PreReleaseType::Alpha => "a",
            PreReleaseType::Beta => "b",
        }
    }
}

impl FromStr for PreReleaseType {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "alpha" | "a" => Ok(PreReleaseType::Alpha),
            "beta" | "b" => Ok(PreReleaseType::Beta),
            _ => Err(ReleaseError::version(format!(
                "Invalid pre-release identifier: '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for PreReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Pre-release part of a version, e.g. `a0` or `b2`
///
/// Ordering follows the stage first, then the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    /// The pre-release stage
    pub identifier: PreReleaseType,
    /// Iteration number within the stage
    pub number: u32,
}

impl PreRelease {
    /// Create a new pre-release marker
    pub fn new(identifier: PreReleaseType, number: u32) -> Self {
        PreRelease { identifier, number }
    }

    /// First alpha of a cycle (`a0`)
    pub fn alpha() -> Self {
        PreRelease::new(PreReleaseType::Alpha, 0)
    }

    /// Parse a marker like "a", "a1", "alpha2", "b" or "beta10"
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(ReleaseError::version("Empty pre-release identifier"));
        }

        let split = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
        let (stage, digits) = s.split_at(split);

        let identifier = PreReleaseType::parse(stage)?;
        let number = if digits.is_empty() {
            0
        } else {
            digits.parse::<u32>().map_err(|_| {
                ReleaseError::version(format!("Invalid pre-release number: '{}'", digits))
            })?
        };

        Ok(PreRelease { identifier, number })
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.identifier, self.number)
    }
}
