//! Immutable backend configuration injected at construction.

use std::path::{Path, PathBuf};

/// Environment variable overriding the templates folder
pub const TEMPLATES_ENV: &str = "REANA_CLUSTER_TEMPLATES";

/// Templates bundled with the crate
const BUNDLED_TEMPLATES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates/kubernetes");

/// Backend defaults: templates, supported version range and naming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Folder holding `config.yaml`, `backend_conf.yaml` and the resource templates
    pub templates_folder: PathBuf,
    /// Oldest supported backend version
    pub min_version: String,
    /// Newest supported backend version
    pub max_version: String,
    /// Namespace used when a manifest does not name one
    pub default_namespace: String,
    /// Prefix of dynamically provisioned storage removed by `down`
    pub sweep_prefix: String,
    /// Ingress controller release managed through helm
    pub ingress: IngressControllerConfig,
}

/// Helm release of the ingress controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressControllerConfig {
    /// Release name
    pub release_name: String,
    /// Namespace the release is installed into
    pub namespace: String,
    /// Chart name
    pub chart: String,
    /// Chart repository URL
    pub repository: String,
    /// Values file, relative to the templates folder
    pub values_file: PathBuf,
}

impl Default for IngressControllerConfig {
    fn default() -> Self {
        Self {
            release_name: "reana-traefik".to_string(),
            namespace: "kube-system".to_string(),
            chart: "traefik".to_string(),
            repository: "https://traefik.github.io/charts".to_string(),
            values_file: PathBuf::from("helm/traefik/minikube.yaml"),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            templates_folder: PathBuf::from(BUNDLED_TEMPLATES),
            min_version: "v1.14.0".to_string(),
            max_version: "v1.16.9".to_string(),
            default_namespace: "default".to_string(),
            sweep_prefix: "csi-cvmfs-".to_string(),
            ingress: IngressControllerConfig::default(),
        }
    }
}

impl BackendConfig {
    /// Compiled defaults with the templates folder taken from
    /// `REANA_CLUSTER_TEMPLATES` when set
    pub fn from_env() -> Self {
        match std::env::var_os(TEMPLATES_ENV) {
            Some(folder) if !folder.is_empty() => Self::default().with_templates_folder(folder),
            _ => Self::default(),
        }
    }

    /// Replace the templates folder
    #[must_use]
    pub fn with_templates_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.templates_folder = folder.into();
        self
    }

    /// Replace the supported version range
    #[must_use]
    pub fn with_version_range(mut self, min: impl Into<String>, max: impl Into<String>) -> Self {
        self.min_version = min.into();
        self.max_version = max.into();
        self
    }

    /// Absolute path of the ingress controller values file
    pub fn ingress_values_path(&self) -> PathBuf {
        self.templates_folder.join(&self.ingress.values_file)
    }

    /// Path of a file inside the templates folder
    pub fn template_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.templates_folder.join(name)
    }
}
