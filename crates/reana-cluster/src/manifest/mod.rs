//! Manifest generation.
//!
//! Renders `backend_conf.yaml` from the backend's templates folder with the
//! parameters of `config.yaml`, the component images of the specification
//! and the runtime feature flags, then splits the result into an ordered
//! [`ManifestSet`].

mod context;
mod filters;
mod render;

pub use context::build_context;
pub use render::{render_templates, split_documents};

use crate::error::ClusterError;
use reana_backend::{BackendConfig, Manifest, ManifestKind};
use reana_spec::ClusterSpecification;
use tracing::debug;

/// Runtime feature flags merged into the specification at generation time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Back the shared volume with CephFS
    pub cephfs: bool,
    /// CephFS volume size in GiB
    pub cephfs_volume_size: Option<u32>,
    /// CephFS storage class name
    pub cephfs_storageclass: Option<String>,
    /// OpenStack share ID backing the CephFS volume
    pub cephfs_os_share_id: Option<String>,
    /// OpenStack share access ID backing the CephFS volume
    pub cephfs_os_share_access_id: Option<String>,
    /// Mount CVMFS repositories
    pub cvmfs: bool,
    /// Run components in debug mode
    pub debug: bool,
    /// Deploy the web UI
    pub ui: bool,
    /// Public URL, preferred over the specification's
    pub url: Option<String>,
}

/// Ordered, immutable collection of rendered manifests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManifestSet {
    manifests: Vec<Manifest>,
}

impl ManifestSet {
    /// Wrap manifests, keeping their order
    pub fn new(manifests: Vec<Manifest>) -> Self {
        Self { manifests }
    }

    /// Manifests in generation order
    pub fn iter(&self) -> std::slice::Iter<'_, Manifest> {
        self.manifests.iter()
    }

    /// Number of manifests
    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    /// Deployment manifests, in order
    pub fn deployments(&self) -> impl Iterator<Item = &Manifest> {
        self.iter().filter(|m| m.kind() == Some(ManifestKind::Deployment))
    }

    /// Find a manifest by kind and name
    pub fn find(&self, kind: ManifestKind, name: &str) -> Option<&Manifest> {
        self.iter().find(|m| m.kind() == Some(kind) && m.name() == name)
    }
}

impl<'a> IntoIterator for &'a ManifestSet {
    type Item = &'a Manifest;
    type IntoIter = std::slice::Iter<'a, Manifest>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Manifest> for ManifestSet {
    fn from_iter<I: IntoIterator<Item = Manifest>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Generate the manifests of a specification.
///
/// # Errors
/// `ClusterError::Configuration` when the parameter file or a template is
/// missing or malformed, a template variable is undefined, a required
/// component is not declared, or a rendered document is not a manifest.
pub fn generate(
    spec: &ClusterSpecification,
    options: &GeneratorOptions,
    config: &BackendConfig,
) -> Result<ManifestSet, ClusterError> {
    let parameters = render::load_parameters(config)?;
    let context = build_context(spec, options, parameters)?;
    let rendered = render_templates(config, &context)?;
    let manifests = split_documents(&rendered)?;

    debug!("Generated {} manifests", manifests.len());
    for manifest in &manifests {
        debug!("  {} {}", manifest.kind_str(), manifest.name());
    }

    Ok(ManifestSet::new(manifests))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = include_str!("../../configurations/reana-cluster.yaml");

    fn spec() -> ClusterSpecification {
        reana_spec::parse_spec(SPEC).unwrap()
    }

    fn names(set: &ManifestSet, kind: ManifestKind) -> Vec<&str> {
        set.iter().filter(|m| m.kind() == Some(kind)).map(Manifest::name).collect()
    }

    #[test]
    fn test_generate_default_spec() {
        let set = generate(&spec(), &GeneratorOptions::default(), &BackendConfig::default()).unwrap();

        assert!(!set.is_empty());
        for manifest in &set {
            assert!(manifest.kind().is_some(), "unsupported kind {}", manifest.kind_str());
        }
        assert_eq!(
            names(&set, ManifestKind::Deployment),
            vec!["db", "cache", "message-broker", "job-controller", "workflow-controller", "server"]
        );
        assert!(set.find(ManifestKind::Ingress, "reana-ingress").is_some());
        assert!(names(&set, ManifestKind::StorageClass).is_empty());
        assert!(set.find(ManifestKind::Deployment, "ui").is_none());
    }

    #[test]
    fn test_images_come_from_spec() {
        let spec = spec();
        let set = generate(&spec, &GeneratorOptions::default(), &BackendConfig::default()).unwrap();
        let server = set.find(ManifestKind::Deployment, "server").unwrap();
        assert_eq!(server.container_image(), Some(spec.components["reana-server"].image.as_str()));
    }

    #[test]
    fn test_whitelisted_environment_is_rendered() {
        let mut spec = spec();
        let server = spec.components.get_mut("reana-server").unwrap();
        server.environment.push(reana_spec::EnvironmentVariable {
            name: "REANA_EXTRA".to_string(),
            value: "yes: really".to_string(),
        });
        let set = generate(&spec, &GeneratorOptions::default(), &BackendConfig::default()).unwrap();
        let server = set.find(ManifestKind::Deployment, "server").unwrap();
        let env = server.as_value().pointer("/spec/template/spec/containers/0/env").unwrap();
        assert!(env.as_array().unwrap().iter().any(|e| e["name"] == "REANA_EXTRA" && e["value"] == "yes: really"));
    }

    #[test]
    fn test_boolean_environment_is_lowercase() {
        let set = generate(&spec(), &GeneratorOptions::default(), &BackendConfig::default()).unwrap();
        let server = set.find(ManifestKind::Deployment, "server").unwrap();
        let env = server.as_value().pointer("/spec/template/spec/containers/0/env").unwrap();
        assert!(env.as_array().unwrap().iter().any(|e| e["name"] == "REANA_DEBUG" && e["value"] == "false"));
    }

    #[test]
    fn test_mount_paths_survive_yaml_syntax() {
        let mut spec = spec();
        spec.cluster.shared_volume_path = "/var/reana: shared".to_string();
        let server = spec.components.get_mut("reana-server").unwrap();
        server.mountpoints.push(reana_spec::MountPoint {
            kind: "hostPath".to_string(),
            name: "data".to_string(),
            path: "/data/run #1:/mnt/run #1".to_string(),
        });
        reana_spec::validate(&spec).unwrap();

        let set = generate(&spec, &GeneratorOptions::default(), &BackendConfig::default()).unwrap();
        let pod = set
            .find(ManifestKind::Deployment, "server")
            .unwrap()
            .as_value()
            .pointer("/spec/template/spec")
            .unwrap();
        let mounts = pod.pointer("/containers/0/volumeMounts").unwrap().as_array().unwrap();
        assert!(mounts.iter().any(|m| m["name"] == "data" && m["mountPath"] == "/mnt/run #1"));
        assert!(mounts.iter().any(|m| m["mountPath"] == "/var/reana: shared"));
        let volumes = pod["volumes"].as_array().unwrap();
        assert!(volumes.iter().any(|v| v["name"] == "data" && v["hostPath"]["path"] == "/data/run #1"));
    }

    #[test]
    fn test_numeric_storage_class_stays_a_string() {
        let options = GeneratorOptions {
            cephfs: true,
            cephfs_storageclass: Some("12345".to_string()),
            ..GeneratorOptions::default()
        };
        let set = generate(&spec(), &options, &BackendConfig::default()).unwrap();
        assert!(set.find(ManifestKind::StorageClass, "12345").is_some());
        let pvc = set.find(ManifestKind::PersistentVolumeClaim, "reana-shared-persistent-volume").unwrap();
        assert_eq!(pvc.as_value()["spec"]["storageClassName"], "12345");
    }

    #[test]
    fn test_feature_flags() {
        let options = GeneratorOptions {
            cephfs: true,
            cvmfs: true,
            ui: true,
            debug: true,
            url: Some("reana.example.org".to_string()),
            ..GeneratorOptions::default()
        };
        let set = generate(&spec(), &options, &BackendConfig::default()).unwrap();

        assert!(set.find(ManifestKind::PersistentVolumeClaim, "reana-shared-persistent-volume").is_some());
        assert!(set.find(ManifestKind::Deployment, "ui").is_some());
        assert!(set.find(ManifestKind::ConfigMap, "ui-config").is_some());
        assert!(names(&set, ManifestKind::StorageClass).iter().any(|n| n.starts_with("csi-cvmfs-")));

        let pvc = set.find(ManifestKind::PersistentVolumeClaim, "reana-shared-persistent-volume").unwrap();
        assert_eq!(pvc.as_value().pointer("/spec/resources/requests/storage").unwrap(), "200Gi");
    }

    #[test]
    fn test_missing_templates_folder() {
        let config = BackendConfig::default().with_templates_folder("/nonexistent/templates");
        let err = generate(&spec(), &GeneratorOptions::default(), &config).unwrap_err();
        assert!(matches!(err, ClusterError::Configuration(_)));
    }

    #[test]
    fn test_missing_component() {
        let mut spec = spec();
        spec.components.remove("reana-cache");
        let err = generate(&spec, &GeneratorOptions::default(), &BackendConfig::default()).unwrap_err();
        assert!(err.to_string().contains("reana-cache"));
    }
}
