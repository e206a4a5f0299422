use crate::domain::Version;
use crate::error::{ReleaseError, Result};

/// Check that `latest_tag <= current <= release`.
///
/// A current version older than the latest tag means the branch is stale; a
/// release older than the current version would move the project backwards.
pub fn validate_versions(latest_tag: &Version, current: &Version, release: &Version) -> Result<()> {
    if latest_tag > current {
        return Err(ReleaseError::version(format!(
            "Current version {} is older than the latest tag {}. Working from an old branch?",
            current, latest_tag
        )));
    }

    if release < current {
        return Err(ReleaseError::version(format!(
            "Requested release {} is not newer than the current version {}",
            release, current
        )));
    }

    Ok(())
}
