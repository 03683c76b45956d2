//! Inspector: read-only queries against a deployed cluster.
//!
//! Resolves component endpoints, compares deployed images and the backend
//! version with the specification, and reports pod status.

mod status;
mod url;
mod version;

pub use status::{ComponentStatus, cluster_ready, get_components_status};
pub use url::build_component_url;
pub use version::{VersionCompatibility, check_compatibility, parse_version};

use crate::config::{DB_COMPONENT, LOCAL_NODE_NAME, admin_token_command, short_component_name};
use crate::error::ClusterError;
use crate::manifest::ManifestSet;
use reana_backend::{BackendError, ClusterBackend};
use reana_spec::ClusterSpecification;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, error, info};

/// Addresses and ports a component is reachable at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentEndpoint {
    pub internal_ip: Option<String>,
    /// Local node address when running on minikube, otherwise the service's external IPs
    pub external_ips: Vec<String>,
    pub ports: Vec<String>,
    pub external_name: Option<String>,
}

impl ComponentEndpoint {
    /// Address a client should connect to
    pub fn host(&self) -> Option<&str> {
        self.external_ips.first().or(self.internal_ip.as_ref()).map(String::as_str)
    }
}

/// Resolve the endpoint of a component's service.
///
/// On a minikube node the node address and node ports are reported. The
/// server is reached through the ingress controller when it is installed.
pub async fn get_component(
    backend: &dyn ClusterBackend,
    component: &str,
    namespace: &str,
) -> Result<ComponentEndpoint, ClusterError> {
    let name = short_component_name(component);
    let node_ip = backend.node_internal_address(LOCAL_NODE_NAME).await?;

    let service = backend
        .read_service(name, namespace)
        .await?
        .ok_or_else(|| BackendError::NotFound(format!("service {name} in namespace {namespace}")))?;
    debug!("{service:?}");

    let mut ports = service.ports.clone();
    if name == "server" {
        let ingress = &backend.config().ingress;
        if let Some(traefik) = backend.read_service(&ingress.release_name, &ingress.namespace).await? {
            debug!("Routing {name} through {}", ingress.release_name);
            ports = traefik.ports;
        }
    }

    let on_minikube = node_ip.is_some();
    let ports = ports
        .iter()
        .map(|p| if on_minikube { p.node_port.unwrap_or(p.port) } else { p.port })
        .map(|p| p.to_string())
        .collect();

    Ok(ComponentEndpoint {
        internal_ip: service.cluster_ip,
        external_ips: node_ip.map_or(service.external_ips, |ip| vec![ip]),
        ports,
        external_name: service.external_name,
    })
}

/// URL of a component as printed by `env`
pub async fn component_url(
    backend: &dyn ClusterBackend,
    component: &str,
    namespace: &str,
    insecure: bool,
) -> Result<String, ClusterError> {
    let endpoint = get_component(backend, component, namespace).await?;
    endpoint
        .host()
        .and_then(|host| build_component_url(host, &endpoint.ports, insecure))
        .ok_or_else(|| ClusterError::NotReady(format!("{component} has no reachable address")))
}

/// Read the administrator access token from the database component
pub async fn admin_access_token(backend: &dyn ClusterBackend, namespace: &str) -> Result<String, ClusterError> {
    let output = backend
        .exec_in_component(DB_COMPONENT, namespace, &admin_token_command())
        .await?;
    let token = output.trim();
    if token.is_empty() {
        return Err(ClusterError::NotReady("administrator token is not set".to_string()));
    }
    Ok(token.to_string())
}

/// Compare the declared image of every Deployment with the deployed one.
///
/// A Deployment that is not deployed counts as a mismatch.
pub async fn verify_components(
    manifests: &ManifestSet,
    backend: &dyn ClusterBackend,
) -> Result<BTreeMap<String, bool>, ClusterError> {
    let default_namespace = &backend.config().default_namespace;
    let mut results = BTreeMap::new();

    for manifest in manifests.deployments() {
        let name = manifest.name();
        let declared = manifest.container_image();
        let deployed = backend.deployed_image(name, manifest.namespace_or(default_namespace)).await?;

        info!(
            "Component {name}: specified image {}, deployed image {}",
            declared.unwrap_or("<none>"),
            deployed.as_deref().unwrap_or("<none>")
        );
        let matches = declared.is_some() && deployed.as_deref() == declared;
        if !matches {
            error!("Mismatch between specified and deployed image of {name}");
        }
        results.insert(name.to_string(), matches);
    }
    Ok(results)
}

/// Compare the live backend version with the supported range and the
/// version declared in the specification
pub async fn verify_backend(
    spec: &ClusterSpecification,
    backend: &dyn ClusterBackend,
) -> Result<VersionCompatibility, ClusterError> {
    let current = backend.server_version().await?;
    let config = backend.config();
    check_compatibility(&current, &spec.cluster.version, &config.min_version, &config.max_version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reana_backend::{Manifest, MockClusterBackend, ServiceInfo, ServicePort};
    use serde_json::json;

    fn port(port: i32, node_port: Option<i32>) -> ServicePort {
        ServicePort {
            name: None,
            port,
            node_port,
        }
    }

    fn server_service() -> ServiceInfo {
        ServiceInfo {
            name: "server".to_string(),
            namespace: "default".to_string(),
            cluster_ip: Some("10.96.0.12".to_string()),
            external_ips: vec!["137.138.6.1".to_string()],
            ports: vec![port(80, Some(31080)), port(443, Some(31443))],
            ..ServiceInfo::default()
        }
    }

    fn deployment(name: &str, image: &str) -> Manifest {
        Manifest::try_from(json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": name},
            "spec": {"template": {"spec": {"containers": [{"name": name, "image": image}]}}}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_component_without_minikube() {
        let mock = MockClusterBackend::default();
        mock.add_service(server_service());

        let endpoint = get_component(&mock, "reana-server", "default").await.unwrap();
        assert_eq!(endpoint.internal_ip.as_deref(), Some("10.96.0.12"));
        assert_eq!(endpoint.external_ips, vec!["137.138.6.1"]);
        assert_eq!(endpoint.ports, vec!["80", "443"]);
        assert_eq!(endpoint.host(), Some("137.138.6.1"));
    }

    #[tokio::test]
    async fn test_get_component_on_minikube_through_traefik() {
        let mock = MockClusterBackend::default();
        mock.add_node("minikube", "192.168.39.2");
        mock.add_service(server_service());
        mock.add_service(ServiceInfo {
            name: "reana-traefik".to_string(),
            namespace: "kube-system".to_string(),
            ports: vec![port(80, Some(30080)), port(443, Some(30443))],
            ..ServiceInfo::default()
        });

        let endpoint = get_component(&mock, "server", "default").await.unwrap();
        assert_eq!(endpoint.external_ips, vec!["192.168.39.2"]);
        assert_eq!(endpoint.ports, vec!["30080", "30443"]);

        let url = component_url(&mock, "reana-server", "default", false).await.unwrap();
        assert_eq!(url, "https://192.168.39.2:30443");
    }

    #[tokio::test]
    async fn test_get_missing_component() {
        let mock = MockClusterBackend::default();
        let err = get_component(&mock, "reana-ui", "default").await.unwrap_err();
        assert!(matches!(err, ClusterError::Backend(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_verify_components() {
        let mock = MockClusterBackend::default();
        let set = ManifestSet::new(vec![
            deployment("server", "reana/server:1.0"),
            deployment("db", "postgres:9.6.2"),
            deployment("cache", "redis:5.0.5"),
        ]);
        mock.set_deployed_image("server", "default", "reana/server:1.0");
        mock.set_deployed_image("db", "default", "postgres:9.6.1");

        let results = verify_components(&set, &mock).await.unwrap();
        assert!(results["server"]);
        assert!(!results["db"]);
        assert!(!results["cache"]);

        mock.set_deployed_image("server", "default", "reana/server:0.9");
        assert!(!verify_components(&set, &mock).await.unwrap()["server"]);
    }

    #[tokio::test]
    async fn test_verify_backend() {
        let mock = MockClusterBackend::default();
        let spec = reana_spec::parse_spec(include_str!("../../configurations/reana-cluster.yaml")).unwrap();
        assert!(verify_backend(&spec, &mock).await.unwrap().is_compatible);

        mock.set_version("v1.17.0");
        let result = verify_backend(&spec, &mock).await.unwrap();
        assert!(!result.is_compatible);
        assert_eq!(result.current_version, "v1.17.0");
    }

    #[tokio::test]
    async fn test_verify_backend_short_declared_version() {
        let mock = MockClusterBackend::default();
        let mut spec = reana_spec::parse_spec(include_str!("../../configurations/reana-cluster.yaml")).unwrap();
        spec.cluster.version = "v1".to_string();
        reana_spec::validate(&spec).unwrap();

        let result = verify_backend(&spec, &mock).await.unwrap();
        assert!(!result.is_compatible);
        assert_eq!(result.declared_version, "v1");
    }

    #[tokio::test]
    async fn test_admin_access_token() {
        let mock = MockClusterBackend::default();
        assert!(admin_access_token(&mock, "default").await.is_err());

        mock.set_exec_output("db", "mBhmnq4dFFGpCKdE1AfE0A\n");
        assert_eq!(admin_access_token(&mock, "default").await.unwrap(), "mBhmnq4dFFGpCKdE1AfE0A");
        assert!(mock.calls().iter().any(|c| c.starts_with("exec default/db psql")));
    }
}
