//! Per-invocation state: specification, manifests and backend connection.

use crate::error::ClusterError;
use crate::manifest::{GeneratorOptions, ManifestSet, generate};
use reana_backend::{BackendConfig, ClusterBackend, KubernetesBackend};
use reana_spec::ClusterSpecification;
use std::path::Path;
use tracing::{debug, info};

/// Connect to the backend named by `cluster.type`
pub async fn connect_backend(
    spec: &ClusterSpecification,
    config: BackendConfig,
) -> Result<Box<dyn ClusterBackend>, ClusterError> {
    let cluster = &spec.cluster;
    match cluster.backend.as_str() {
        "kubernetes" => {
            let backend = KubernetesBackend::connect(
                config,
                cluster.config.as_deref(),
                cluster.config_context.as_deref(),
            )
            .await?;
            Ok(Box::new(backend))
        }
        other => Err(ClusterError::configuration(format!(
            "unsupported cluster type {other}"
        ))),
    }
}

/// Loaded specification and its generated manifests.
///
/// The backend is connected on demand so commands that only generate
/// manifests work without a cluster.
#[derive(Debug)]
pub struct Session {
    pub spec: ClusterSpecification,
    pub manifests: ManifestSet,
    config: BackendConfig,
}

impl Session {
    /// Load the specification file and generate its manifests
    pub fn load(
        spec_file: &Path,
        skip_validation: bool,
        options: &GeneratorOptions,
        config: BackendConfig,
    ) -> Result<Self, ClusterError> {
        let spec = reana_spec::load_spec_file(spec_file, skip_validation)?;
        Self::new(spec, options, config)
    }

    /// Generate the manifests of an already loaded specification
    pub fn new(
        spec: ClusterSpecification,
        options: &GeneratorOptions,
        config: BackendConfig,
    ) -> Result<Self, ClusterError> {
        debug!("Using templates from {}", config.templates_folder.display());
        let manifests = generate(&spec, options, &config)?;
        Ok(Self {
            spec,
            manifests,
            config,
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Connect to the cluster named in the specification
    pub async fn connect(&self) -> Result<Box<dyn ClusterBackend>, ClusterError> {
        let backend = connect_backend(&self.spec, self.config.clone()).await?;
        info!("Connecting to {} at {}", backend.cluster_type(), backend.cluster_url());
        Ok(backend)
    }
}
