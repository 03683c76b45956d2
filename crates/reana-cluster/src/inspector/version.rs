//! Backend version compatibility.

use crate::error::ClusterError;
use semver::Version;
use serde::Serialize;
use tracing::{error, info};

/// Result of comparing the live backend version with the supported range
/// and the declared version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionCompatibility {
    pub current_version: String,
    pub declared_version: String,
    pub is_compatible: bool,
    pub min_version: String,
    pub max_version: String,
}

/// Parse a backend version such as `v1.16.3`, `1.16` or `v1.16.3-gke.1`.
///
/// Vendor suffixes after `-` or `+` are ignored and missing minor or patch
/// components count as `0`.
pub fn parse_version(raw: &str) -> Result<Version, ClusterError> {
    let trimmed = raw.trim();
    let core = trimmed.strip_prefix('v').unwrap_or(trimmed);
    let core = core.split(['-', '+']).next().unwrap_or_default();
    let padded = match core.matches('.').count() {
        0 => format!("{core}.0.0"),
        1 => format!("{core}.0"),
        _ => core.to_string(),
    };
    Version::parse(&padded)
        .map_err(|e| ClusterError::configuration(format!("invalid version {raw}: {e}")))
}

/// Compare `current` and `declared` with the inclusive `min..=max` range.
///
/// Compatible when both lie within the range and are equal.
pub fn check_compatibility(
    current: &str,
    declared: &str,
    min: &str,
    max: &str,
) -> Result<VersionCompatibility, ClusterError> {
    let current_version = parse_version(current)?;
    let declared_version = parse_version(declared)?;
    let min_version = parse_version(min)?;
    let max_version = parse_version(max)?;

    info!(
        "Current version: {current}, specified version: {declared}, supported range: {min} - {max}"
    );

    let supported = |v: &Version| *v >= min_version && *v <= max_version;
    let is_compatible = if current_version > max_version {
        error!("Your Kubernetes version is too new: {current}. Newest version REANA supports is: {max}");
        false
    } else if current_version < min_version {
        error!("Your Kubernetes version is too old: {current}. Oldest version REANA supports is: {min}");
        false
    } else if !supported(&declared_version) {
        error!("Specified Kubernetes version {declared} is outside the supported range {min} - {max}");
        false
    } else if declared_version != current_version {
        error!("Your Kubernetes version {current} does not match the specified version {declared}");
        false
    } else {
        true
    };

    Ok(VersionCompatibility {
        current_version: current.to_string(),
        declared_version: declared.to_string(),
        is_compatible,
        min_version: min.to_string(),
        max_version: max.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("v1.16.3").unwrap(), Version::new(1, 16, 3));
        assert_eq!(parse_version("1.16").unwrap(), Version::new(1, 16, 0));
        assert_eq!(parse_version("v1.16.3-gke.1").unwrap(), Version::new(1, 16, 3));
        assert_eq!(parse_version("v1.16.3+k3s1").unwrap(), Version::new(1, 16, 3));
        assert_eq!(parse_version("v1").unwrap(), Version::new(1, 0, 0));
        assert_eq!(parse_version("2").unwrap(), Version::new(2, 0, 0));
        assert!(parse_version("latest").is_err());
    }

    #[test]
    fn test_too_new() {
        let result = check_compatibility("v1.17.0", "v1.16.3", "v1.16.0", "v1.16.9").unwrap();
        assert!(!result.is_compatible);
        assert_eq!(result.current_version, "v1.17.0");
    }

    #[test]
    fn test_compatible() {
        let result = check_compatibility("v1.16.3", "v1.16.3", "v1.16.0", "v1.16.9").unwrap();
        assert!(result.is_compatible);
        assert_eq!(result.max_version, "v1.16.9");
    }

    #[test]
    fn test_range_is_inclusive() {
        assert!(check_compatibility("v1.16.9", "v1.16.9", "v1.16.0", "v1.16.9").unwrap().is_compatible);
        assert!(check_compatibility("v1.16.0", "v1.16.0", "v1.16.0", "v1.16.9").unwrap().is_compatible);
    }

    #[test]
    fn test_declared_mismatch_is_incompatible() {
        let result = check_compatibility("v1.16.3", "v1.16.2", "v1.16.0", "v1.16.9").unwrap();
        assert!(!result.is_compatible);
    }

    #[test]
    fn test_too_old() {
        assert!(!check_compatibility("v1.13.0", "v1.16.3", "v1.14.0", "v1.16.9").unwrap().is_compatible);
    }
}
