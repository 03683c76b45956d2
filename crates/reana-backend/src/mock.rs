//! Mock cluster backend for unit testing
//!
//! Stores created objects and secrets in memory and can be configured with
//! pods, services, nodes and injected failures to exercise the reconciler
//! and inspector without a running cluster.

use crate::backend_trait::{ClusterBackend, SecretStore};
use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::manifest::{Manifest, ManifestKind};
use crate::models::*;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Object key: kind, namespace, name
type ObjectKey = (ManifestKind, String, String);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock backend for testing
#[derive(Debug, Clone)]
pub struct MockClusterBackend {
    config: BackendConfig,
    // In-memory cluster state
    objects: Arc<Mutex<BTreeMap<ObjectKey, Manifest>>>,
    secrets: Arc<Mutex<BTreeMap<(String, String), BTreeMap<String, String>>>>,
    pods: Arc<Mutex<BTreeMap<String, Vec<PodState>>>>,
    services: Arc<Mutex<BTreeMap<(String, String), ServiceInfo>>>,
    nodes: Arc<Mutex<BTreeMap<String, String>>>,
    image_overrides: Arc<Mutex<BTreeMap<(String, String), String>>>,
    version: Arc<Mutex<String>>,
    service_account_token: Arc<Mutex<Option<String>>>,
    exec_outputs: Arc<Mutex<BTreeMap<String, String>>>,
    ingress_installed: Arc<Mutex<bool>>,
    // Failures returned instead of performing a call
    failures: Arc<Mutex<BTreeMap<(String, String), u16>>>,
    // Every mutating call, in order
    calls: Arc<Mutex<Vec<String>>>,
}

impl Default for MockClusterBackend {
    fn default() -> Self {
        Self::new(BackendConfig::default())
    }
}

impl MockClusterBackend {
    /// Create an empty mock cluster running `v1.16.3`
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            objects: Arc::default(),
            secrets: Arc::default(),
            pods: Arc::default(),
            services: Arc::default(),
            nodes: Arc::default(),
            image_overrides: Arc::default(),
            version: Arc::new(Mutex::new("v1.16.3".to_string())),
            service_account_token: Arc::default(),
            exec_outputs: Arc::default(),
            ingress_installed: Arc::default(),
            failures: Arc::default(),
            calls: Arc::default(),
        }
    }

    /// Set the version reported by the API server
    pub fn set_version(&self, version: impl Into<String>) {
        *lock(&self.version) = version.into();
    }

    /// Set the service account token secret name
    pub fn set_service_account_token(&self, name: impl Into<String>) {
        *lock(&self.service_account_token) = Some(name.into());
    }

    /// Add a pod listing entry (for test setup)
    pub fn add_pod(&self, namespace: &str, pod: PodState) {
        lock(&self.pods).entry(namespace.to_string()).or_default().push(pod);
    }

    /// Add a service (for test setup)
    pub fn add_service(&self, service: ServiceInfo) {
        lock(&self.services).insert((service.namespace.clone(), service.name.clone()), service);
    }

    /// Add a node with its internal address (for test setup)
    pub fn add_node(&self, name: &str, internal_ip: &str) {
        lock(&self.nodes).insert(name.to_string(), internal_ip.to_string());
    }

    /// Add an object directly, bypassing `create` (for test setup)
    pub fn add_object(&self, manifest: Manifest) -> Result<(), BackendError> {
        let kind: ManifestKind = manifest.kind_str().parse()?;
        let key = self.key(kind, manifest.name(), manifest.namespace_or(&self.config.default_namespace));
        lock(&self.objects).insert(key, manifest);
        Ok(())
    }

    /// Report `image` for a deployment regardless of its manifest
    pub fn set_deployed_image(&self, name: &str, namespace: &str, image: &str) {
        lock(&self.image_overrides).insert((namespace.to_string(), name.to_string()), image.to_string());
    }

    /// Set the output of `exec_in_component` for a component
    pub fn set_exec_output(&self, component: &str, output: &str) {
        lock(&self.exec_outputs).insert(component.to_string(), output.to_string());
    }

    /// Make calls touching `kind`/`name` fail with an API error
    pub fn fail_with(&self, kind: &str, name: &str, code: u16) {
        lock(&self.failures).insert((kind.to_string(), name.to_string()), code);
    }

    /// Whether an object exists
    pub fn contains(&self, kind: ManifestKind, name: &str, namespace: &str) -> bool {
        lock(&self.objects).contains_key(&self.key(kind, name, namespace))
    }

    /// Stored object
    pub fn object(&self, kind: ManifestKind, name: &str, namespace: &str) -> Option<Manifest> {
        lock(&self.objects).get(&self.key(kind, name, namespace)).cloned()
    }

    /// Number of stored objects
    pub fn object_count(&self) -> usize {
        lock(&self.objects).len()
    }

    /// Stored secret data
    pub fn secret(&self, name: &str, namespace: &str) -> Option<BTreeMap<String, String>> {
        lock(&self.secrets).get(&(namespace.to_string(), name.to_string())).cloned()
    }

    /// Whether the ingress controller release is installed
    pub fn ingress_installed(&self) -> bool {
        *lock(&self.ingress_installed)
    }

    /// Mutating calls made so far, e.g. `create Deployment default/server`
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Forget recorded calls
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn key(&self, kind: ManifestKind, name: &str, namespace: &str) -> ObjectKey {
        let namespace = if kind.is_namespaced() { namespace } else { "" };
        (kind, namespace.to_string(), name.to_string())
    }

    fn record(&self, call: String) {
        lock(&self.calls).push(call);
    }

    fn injected_failure(&self, kind: &str, name: &str) -> Result<(), BackendError> {
        match lock(&self.failures).get(&(kind.to_string(), name.to_string())) {
            Some(code) => Err(BackendError::Api {
                code: *code,
                message: format!("injected failure for {kind} {name}"),
            }),
            None => Ok(()),
        }
    }

    fn names_of(&self, kind: ManifestKind, namespace: &str) -> Vec<String> {
        let namespace = if kind.is_namespaced() { namespace } else { "" };
        lock(&self.objects)
            .keys()
            .filter(|(k, ns, _)| *k == kind && ns == namespace)
            .map(|(_, _, name)| name.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl SecretStore for MockClusterBackend {
    async fn secret_exists(&self, name: &str, namespace: &str) -> Result<bool, BackendError> {
        self.injected_failure("Secret", name)?;
        Ok(lock(&self.secrets).contains_key(&(namespace.to_string(), name.to_string())))
    }

    async fn create_secret(
        &self,
        name: &str,
        namespace: &str,
        data: &BTreeMap<String, String>,
    ) -> Result<Outcome, BackendError> {
        self.injected_failure("Secret", name)?;
        self.record(format!("create Secret {namespace}/{name}"));
        let mut secrets = lock(&self.secrets);
        let key = (namespace.to_string(), name.to_string());
        if secrets.contains_key(&key) {
            return Ok(Outcome::AlreadyExists);
        }
        secrets.insert(key, data.clone());
        Ok(Outcome::Applied)
    }

    async fn delete_secret(&self, name: &str, namespace: &str) -> Result<Outcome, BackendError> {
        self.injected_failure("Secret", name)?;
        self.record(format!("delete Secret {namespace}/{name}"));
        match lock(&self.secrets).remove(&(namespace.to_string(), name.to_string())) {
            Some(_) => Ok(Outcome::Applied),
            None => Ok(Outcome::AlreadyGone),
        }
    }
}

#[async_trait::async_trait]
impl ClusterBackend for MockClusterBackend {
    fn cluster_type(&self) -> &str {
        "Mock"
    }

    fn cluster_url(&self) -> &str {
        "https://mock-cluster:6443"
    }

    fn config(&self) -> &BackendConfig {
        &self.config
    }

    async fn create(&self, manifest: &Manifest) -> Result<Outcome, BackendError> {
        let kind: ManifestKind = manifest.kind_str().parse()?;
        self.injected_failure(kind.as_str(), manifest.name())?;

        let namespace = manifest.namespace_or(&self.config.default_namespace);
        self.record(format!("create {kind} {namespace}/{}", manifest.name()));

        let key = self.key(kind, manifest.name(), namespace);
        let mut objects = lock(&self.objects);
        if objects.contains_key(&key) {
            return Ok(Outcome::AlreadyExists);
        }
        objects.insert(key, manifest.clone());
        Ok(Outcome::Applied)
    }

    async fn delete(&self, kind: ManifestKind, name: &str, namespace: &str) -> Result<Outcome, BackendError> {
        self.injected_failure(kind.as_str(), name)?;
        self.record(format!("delete {kind} {namespace}/{name}"));

        match lock(&self.objects).remove(&self.key(kind, name, namespace)) {
            Some(_) => Ok(Outcome::Applied),
            None => Ok(Outcome::AlreadyGone),
        }
    }

    async fn deployed_image(&self, name: &str, namespace: &str) -> Result<Option<String>, BackendError> {
        self.injected_failure("Deployment", name)?;
        if let Some(image) = lock(&self.image_overrides).get(&(namespace.to_string(), name.to_string())) {
            return Ok(Some(image.clone()));
        }
        Ok(self
            .object(ManifestKind::Deployment, name, namespace)
            .and_then(|m| m.container_image().map(str::to_string)))
    }

    async fn server_version(&self) -> Result<String, BackendError> {
        Ok(lock(&self.version).clone())
    }

    async fn service_account_token(&self, _namespace: &str) -> Result<Option<String>, BackendError> {
        Ok(lock(&self.service_account_token).clone())
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodState>, BackendError> {
        Ok(lock(&self.pods).get(namespace).cloned().unwrap_or_default())
    }

    async fn read_service(&self, name: &str, namespace: &str) -> Result<Option<ServiceInfo>, BackendError> {
        self.injected_failure("Service", name)?;
        Ok(lock(&self.services).get(&(namespace.to_string(), name.to_string())).cloned())
    }

    async fn node_internal_address(&self, node: &str) -> Result<Option<String>, BackendError> {
        Ok(lock(&self.nodes).get(node).cloned())
    }

    async fn list_storage_classes(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.names_of(ManifestKind::StorageClass, ""))
    }

    async fn list_persistent_volume_claims(&self, namespace: &str) -> Result<Vec<String>, BackendError> {
        Ok(self.names_of(ManifestKind::PersistentVolumeClaim, namespace))
    }

    async fn exec_in_component(&self, component: &str, namespace: &str, command: &[String]) -> Result<String, BackendError> {
        self.record(format!("exec {namespace}/{component} {}", command.join(" ")));
        lock(&self.exec_outputs)
            .get(component)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("no pod for component {component} in {namespace}")))
    }

    async fn install_ingress_controller(&self) -> Result<(), BackendError> {
        self.injected_failure("HelmRelease", &self.config.ingress.release_name)?;
        self.record(format!("helm install {}", self.config.ingress.release_name));
        *lock(&self.ingress_installed) = true;
        Ok(())
    }

    async fn uninstall_ingress_controller(&self) -> Result<(), BackendError> {
        self.injected_failure("HelmRelease", &self.config.ingress.release_name)?;
        self.record(format!("helm uninstall {}", self.config.ingress.release_name));
        *lock(&self.ingress_installed) = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service_manifest(name: &str) -> Manifest {
        Manifest::try_from(json!({"apiVersion": "v1", "kind": "Service", "metadata": {"name": name}})).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_already_exists() {
        let mock = MockClusterBackend::default();
        let manifest = service_manifest("server");
        assert_eq!(mock.create(&manifest).await.unwrap(), Outcome::Applied);
        assert_eq!(mock.create(&manifest).await.unwrap(), Outcome::AlreadyExists);
        assert!(mock.contains(ManifestKind::Service, "server", "default"));
    }

    #[tokio::test]
    async fn test_delete_then_already_gone() {
        let mock = MockClusterBackend::default();
        mock.create(&service_manifest("server")).await.unwrap();
        assert_eq!(mock.delete(ManifestKind::Service, "server", "default").await.unwrap(), Outcome::Applied);
        assert_eq!(mock.delete(ManifestKind::Service, "server", "default").await.unwrap(), Outcome::AlreadyGone);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let mock = MockClusterBackend::default();
        mock.fail_with("Service", "server", 500);
        let err = mock.create(&service_manifest("server")).await.unwrap_err();
        assert_eq!(err.status_code(), Some(500));
    }

    #[tokio::test]
    async fn test_cluster_scoped_objects_ignore_namespace() {
        let mock = MockClusterBackend::default();
        let sc = Manifest::try_from(json!({
            "kind": "StorageClass",
            "metadata": {"name": "csi-cvmfs-atlas", "namespace": "ignored"}
        }))
        .unwrap();
        mock.create(&sc).await.unwrap();
        assert_eq!(mock.list_storage_classes().await.unwrap(), vec!["csi-cvmfs-atlas"]);
    }
}
