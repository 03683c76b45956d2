//! Loading and validation of specification files.

use crate::cluster::ClusterSpecification;
use crate::error::SpecError;
use std::path::Path;
use tracing::{debug, info};

/// Backend keys accepted in `cluster.type`
pub const SUPPORTED_BACKENDS: &[&str] = &["kubernetes"];

/// Volume types accepted in component mount points
const SUPPORTED_MOUNT_TYPES: &[&str] = &["hostPath"];

/// Load a specification file and, unless skipped, validate it.
///
/// # Errors
/// * `SpecError::Io` - the file cannot be read
/// * `SpecError::Yaml` - the file is not a well-formed specification
/// * `SpecError::Validation` - a validation rule failed
pub fn load_spec_file(
    path: impl AsRef<Path>,
    skip_validation: bool,
) -> Result<ClusterSpecification, SpecError> {
    let path = path.as_ref();
    debug!("Loading REANA cluster specification from {}", path.display());

    let contents = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = parse_spec(&contents)?;

    if !skip_validation {
        info!("Validating REANA cluster specification file: {}", path.display());
        validate(&spec)?;
        info!("{} is a valid REANA cluster specification.", path.display());
    }

    Ok(spec)
}

/// Parse a specification document without validating it
pub fn parse_spec(contents: &str) -> Result<ClusterSpecification, SpecError> {
    Ok(serde_yaml::from_str(contents)?)
}

/// Validate a parsed specification.
///
/// Checks the rules a schema would express: known backend type, a
/// well-formed target version, non-empty images, valid environment names
/// and `host:container` mount points of a supported type.
pub fn validate(spec: &ClusterSpecification) -> Result<(), SpecError> {
    let cluster = &spec.cluster;

    if !SUPPORTED_BACKENDS.contains(&cluster.backend.as_str()) {
        return Err(SpecError::Validation(format!(
            "unsupported cluster type '{}', expected one of: {}",
            cluster.backend,
            SUPPORTED_BACKENDS.join(", ")
        )));
    }

    if !is_version_string(&cluster.version) {
        return Err(SpecError::Validation(format!(
            "cluster.version '{}' is not a version string like v1.16.3",
            cluster.version
        )));
    }

    if cluster.cephfs_volume_size == Some(0) {
        return Err(SpecError::Validation(
            "cluster.cephfs_volume_size must be greater than zero".to_string(),
        ));
    }

    if spec.components.is_empty() {
        return Err(SpecError::Validation("no components declared".to_string()));
    }

    for (name, component) in &spec.components {
        if component.image.trim().is_empty() || component.image.contains(char::is_whitespace) {
            return Err(SpecError::Validation(format!(
                "component {name} has an invalid image '{}'",
                component.image
            )));
        }

        for var in &component.environment {
            if !is_env_name(&var.name) {
                return Err(SpecError::Validation(format!(
                    "component {name} declares an invalid environment variable name '{}'",
                    var.name
                )));
            }
        }

        for mount in &component.mountpoints {
            if !SUPPORTED_MOUNT_TYPES.contains(&mount.kind.as_str()) {
                return Err(SpecError::Validation(format!(
                    "component {name} mount point {} has unsupported type '{}'",
                    mount.name, mount.kind
                )));
            }
            if mount.name.is_empty() {
                return Err(SpecError::Validation(format!(
                    "component {name} declares a mount point without a name"
                )));
            }
            let complete = matches!(
                (mount.host_path(), mount.mount_path()),
                (Some(host), Some(target)) if !host.is_empty() && !target.is_empty()
            );
            if !complete {
                return Err(SpecError::Validation(format!(
                    "component {name} mount point {} path '{}' must be <host path>:<mount path>",
                    mount.name, mount.path
                )));
            }
        }
    }

    Ok(())
}

fn is_version_string(version: &str) -> bool {
    let digits = version.strip_prefix('v').unwrap_or(version);
    let core = digits.split(['-', '+']).next().unwrap_or_default();
    let parts: Vec<&str> = core.split('.').collect();
    (1..=3).contains(&parts.len())
        && parts.iter().all(|part| {
            !part.is_empty()
                && part.chars().all(|c| c.is_ascii_digit())
                && (*part == "0" || !part.starts_with('0'))
        })
}

fn is_env_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SPEC: &str = r#"
cluster:
  type: "kubernetes"
  version: "v1.16.3"
  reana_url: "reana.io"
components:
  reana-server:
    image: "reanahub/reana-server:0.5.0"
    environment:
      - REANA_DEBUG: 0
    mountpoints:
      - type: hostPath
        name: reana-code
        path: "/code/reana-server:/code"
  reana-db:
    image: "postgres:9.6.2"
"#;

    #[test]
    fn test_parse_defaults() {
        let spec = parse_spec(SPEC).unwrap();
        assert_eq!(spec.cluster.backend, "kubernetes");
        assert_eq!(spec.cluster.root_path, "/var/reana");
        assert!(!spec.cluster.ui);
        assert!(spec.cluster.cephfs_volume_size.is_none());
        assert_eq!(spec.components.len(), 2);
        assert!(spec.components["reana-db"].environment.is_empty());
    }

    #[test]
    fn test_valid_spec_passes() {
        let spec = parse_spec(SPEC).unwrap();
        assert!(validate(&spec).is_ok());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let mut spec = parse_spec(SPEC).unwrap();
        spec.cluster.backend = "nomad".to_string();
        let err = validate(&spec).unwrap_err();
        assert!(err.to_string().contains("unsupported cluster type 'nomad'"));
    }

    #[test]
    fn test_bad_version_rejected() {
        let mut spec = parse_spec(SPEC).unwrap();
        spec.cluster.version = "latest".to_string();
        assert!(matches!(validate(&spec), Err(SpecError::Validation(_))));
    }

    #[test]
    fn test_version_strings() {
        assert!(is_version_string("v1.16.3"));
        assert!(is_version_string("1.16"));
        assert!(is_version_string("v1.16.3-gke.1"));
        assert!(!is_version_string("v"));
        assert!(!is_version_string("v1..3"));
        assert!(is_version_string("v1"));
        assert!(is_version_string("v1.0.3"));
        assert!(!is_version_string("v1.016.3"));
        assert!(!is_version_string("v1.16.3.4"));
    }

    #[test]
    fn test_bad_mountpoint_rejected() {
        let mut spec = parse_spec(SPEC).unwrap();
        let server = spec.components.get_mut("reana-server").unwrap();
        server.mountpoints[0].path = "/code/reana-server".to_string();
        let err = validate(&spec).unwrap_err();
        assert!(err.to_string().contains("<host path>:<mount path>"));
    }

    #[test]
    fn test_bad_environment_name_rejected() {
        let mut spec = parse_spec(SPEC).unwrap();
        let server = spec.components.get_mut("reana-server").unwrap();
        server.environment[0].name = "1BAD-NAME".to_string();
        assert!(validate(&spec).is_err());
    }

    #[test]
    fn test_missing_component_lookup() {
        let spec = parse_spec(SPEC).unwrap();
        assert!(spec.component("reana-server").is_ok());
        assert!(matches!(
            spec.component("reana-ui"),
            Err(SpecError::MissingComponent(name)) if name == "reana-ui"
        ));
    }

    #[test]
    fn test_load_spec_file_skip_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let invalid = SPEC.replace("\"kubernetes\"", "\"swarm\"");
        file.write_all(invalid.as_bytes()).unwrap();

        assert!(load_spec_file(file.path(), false).is_err());
        let spec = load_spec_file(file.path(), true).unwrap();
        assert_eq!(spec.cluster.backend, "swarm");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_spec_file("/nonexistent/reana-cluster.yaml", false).unwrap_err();
        assert!(matches!(err, SpecError::Io { .. }));
    }
}
