//! Backend traits for mocking
//!
//! The reconciler and inspector are written against these traits. The
//! Kubernetes client implements them, and tests use the in-memory mock.

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::manifest::{Manifest, ManifestKind};
use crate::models::*;
use std::collections::BTreeMap;

/// Named key/value secrets
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    /// Whether the secret exists in `namespace`
    async fn secret_exists(&self, name: &str, namespace: &str) -> Result<bool, BackendError>;

    /// Create a secret; an existing one is left untouched
    async fn create_secret(
        &self,
        name: &str,
        namespace: &str,
        data: &BTreeMap<String, String>,
    ) -> Result<Outcome, BackendError>;

    /// Delete a secret
    async fn delete_secret(&self, name: &str, namespace: &str) -> Result<Outcome, BackendError>;
}

/// Trait for cluster backend operations
///
/// All async methods must be `Send` so the trait object can be shared with
/// any Tokio runtime flavour.
#[async_trait::async_trait]
pub trait ClusterBackend: SecretStore {
    /// Backend kind, e.g. `Kubernetes`
    fn cluster_type(&self) -> &str;

    /// API server URL
    fn cluster_url(&self) -> &str;

    /// Configuration the backend was built with
    fn config(&self) -> &BackendConfig;

    /// Create the object described by `manifest`.
    ///
    /// An object that already exists yields [`Outcome::AlreadyExists`].
    async fn create(&self, manifest: &Manifest) -> Result<Outcome, BackendError>;
    /// Delete an object; Deployments are deleted with foreground propagation.
    ///
    /// An absent object yields [`Outcome::AlreadyGone`].
    async fn delete(&self, kind: ManifestKind, name: &str, namespace: &str) -> Result<Outcome, BackendError>;

    /// Image of the first container of a live Deployment, `None` when absent
    async fn deployed_image(&self, name: &str, namespace: &str) -> Result<Option<String>, BackendError>;
    /// API server version, e.g. `v1.16.3`
    async fn server_version(&self) -> Result<String, BackendError>;
    /// Name of the secret holding the default service account token
    async fn service_account_token(&self, namespace: &str) -> Result<Option<String>, BackendError>;
    /// Pods in `namespace` with their container statuses
    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodState>, BackendError>;
    /// A service, `None` when absent
    async fn read_service(&self, name: &str, namespace: &str) -> Result<Option<ServiceInfo>, BackendError>;
    /// Internal IP of a node, `None` when the node does not exist
    async fn node_internal_address(&self, node: &str) -> Result<Option<String>, BackendError>;
    /// Names of all storage classes
    async fn list_storage_classes(&self) -> Result<Vec<String>, BackendError>;
    /// Names of the persistent volume claims in `namespace`
    async fn list_persistent_volume_claims(&self, namespace: &str) -> Result<Vec<String>, BackendError>;

    /// Run `command` in the first pod of `component` and return its stdout
    async fn exec_in_component(&self, component: &str, namespace: &str, command: &[String]) -> Result<String, BackendError>;
    /// Install the ingress controller release
    async fn install_ingress_controller(&self) -> Result<(), BackendError>;
    /// Remove the ingress controller release
    async fn uninstall_ingress_controller(&self) -> Result<(), BackendError>;
}
