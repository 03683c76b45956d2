//! Kubernetes implementation of the cluster backend.
//!
//! Manifests are dispatched by kind to the matching typed API. Create maps
//! HTTP 409 to [`Outcome::AlreadyExists`]; delete maps 404 to
//! [`Outcome::AlreadyGone`] and 409 to [`Outcome::Conflict`].

use crate::backend_trait::{ClusterBackend, SecretStore};
use crate::commands::{self, KubeContext};
use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::manifest::{Manifest, ManifestKind};
use crate::models::*;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{
    ConfigMap, Namespace, Node, PersistentVolumeClaim, Pod, ResourceQuota, Secret, Service,
    ServiceAccount,
};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding};
use k8s_openapi::api::storage::v1::StorageClass;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::api::{Api, DeleteParams, ListParams, PostParams, PropagationPolicy};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, Resource};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info};

/// Secret type holding a service account's API credentials
const SERVICE_ACCOUNT_TOKEN_TYPE: &str = "kubernetes.io/service-account-token";

/// Grace period granted to Deployment pods on delete
const DEPLOYMENT_GRACE_PERIOD_SECONDS: u32 = 5;

/// Kubernetes cluster backend
pub struct KubernetesBackend {
    client: Client,
    cluster_url: String,
    config: BackendConfig,
    kube: KubeContext,
}

impl Debug for KubernetesBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubernetesBackend")
            .field("cluster_url", &self.cluster_url)
            .field("config", &self.config)
            .field("kube", &self.kube)
            .finish_non_exhaustive()
    }
}

impl KubernetesBackend {
    /// Connect using a kubeconfig file and context.
    ///
    /// With neither set, the configuration is inferred the usual way
    /// (`$KUBECONFIG`, `~/.kube/config`, then in-cluster).
    pub async fn connect(
        config: BackendConfig,
        kubeconfig: Option<&Path>,
        context: Option<&str>,
    ) -> Result<Self, BackendError> {
        debug!("Creating a backend object for Kubernetes interaction");

        let options = KubeConfigOptions {
            context: context.map(str::to_string),
            ..KubeConfigOptions::default()
        };
        let client_config = match (kubeconfig, context) {
            (Some(path), _) => {
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    BackendError::Config(format!("{}: {e}", path.display()))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| BackendError::Config(e.to_string()))?
            }
            (None, Some(_)) => Config::from_kubeconfig(&options)
                .await
                .map_err(|e| BackendError::Config(e.to_string()))?,
            (None, None) => Config::infer()
                .await
                .map_err(|e| BackendError::Config(e.to_string()))?,
        };

        let cluster_url = client_config.cluster_url.to_string();
        let client = Client::try_from(client_config)?;

        Ok(Self {
            client,
            cluster_url,
            config,
            kube: KubeContext {
                kubeconfig: kubeconfig.map(Path::to_path_buf),
                context: context.map(str::to_string),
            },
        })
    }

    fn namespaced<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn cluster<K>(&self) -> Api<K>
    where
        K: Resource<Scope = ClusterResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::all(self.client.clone())
    }

    async fn create_in<K>(api: Api<K>, manifest: &Manifest) -> Result<Outcome, BackendError>
    where
        K: Clone + DeserializeOwned + Serialize + Debug,
    {
        let object: K = manifest.to_resource()?;
        match api.create(&PostParams::default(), &object).await {
            Ok(_) => Ok(Outcome::Applied),
            Err(kube::Error::Api(ae)) if ae.code == 409 => Ok(Outcome::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_in<K>(api: Api<K>, name: &str, params: &DeleteParams) -> Result<Outcome, BackendError>
    where
        K: Clone + DeserializeOwned + Debug,
    {
        match api.delete(name, params).await {
            Ok(_) => Ok(Outcome::Applied),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(Outcome::AlreadyGone),
            Err(kube::Error::Api(ae)) if ae.code == 409 => Ok(Outcome::Conflict),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait::async_trait]
impl SecretStore for KubernetesBackend {
    async fn secret_exists(&self, name: &str, namespace: &str) -> Result<bool, BackendError> {
        let api: Api<Secret> = self.namespaced(namespace);
        Ok(api.get_opt(name).await?.is_some())
    }

    async fn create_secret(
        &self,
        name: &str,
        namespace: &str,
        data: &BTreeMap<String, String>,
    ) -> Result<Outcome, BackendError> {
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..ObjectMeta::default()
            },
            string_data: Some(data.clone()),
            type_: Some("Opaque".to_string()),
            ..Secret::default()
        };
        let api: Api<Secret> = self.namespaced(namespace);
        match api.create(&PostParams::default(), &secret).await {
            Ok(_) => Ok(Outcome::Applied),
            Err(kube::Error::Api(ae)) if ae.code == 409 => Ok(Outcome::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_secret(&self, name: &str, namespace: &str) -> Result<Outcome, BackendError> {
        Self::delete_in(self.namespaced::<Secret>(namespace), name, &DeleteParams::default()).await
    }
}

#[async_trait::async_trait]
impl ClusterBackend for KubernetesBackend {
    fn cluster_type(&self) -> &str {
        "Kubernetes"
    }

    fn cluster_url(&self) -> &str {
        &self.cluster_url
    }

    fn config(&self) -> &BackendConfig {
        &self.config
    }

    async fn create(&self, manifest: &Manifest) -> Result<Outcome, BackendError> {
        let kind: ManifestKind = manifest.kind_str().parse()?;
        let ns = manifest.namespace_or(&self.config.default_namespace);

        match kind {
            ManifestKind::Deployment => Self::create_in(self.namespaced::<Deployment>(ns), manifest).await,
            ManifestKind::Namespace => Self::create_in(self.cluster::<Namespace>(), manifest).await,
            ManifestKind::ResourceQuota => Self::create_in(self.namespaced::<ResourceQuota>(ns), manifest).await,
            ManifestKind::Service => Self::create_in(self.namespaced::<Service>(ns), manifest).await,
            ManifestKind::ClusterRole => Self::create_in(self.cluster::<ClusterRole>(), manifest).await,
            ManifestKind::ClusterRoleBinding => Self::create_in(self.cluster::<ClusterRoleBinding>(), manifest).await,
            ManifestKind::Ingress => Self::create_in(self.namespaced::<Ingress>(ns), manifest).await,
            ManifestKind::ServiceAccount => Self::create_in(self.namespaced::<ServiceAccount>(ns), manifest).await,
            ManifestKind::StorageClass => Self::create_in(self.cluster::<StorageClass>(), manifest).await,
            ManifestKind::PersistentVolumeClaim => {
                Self::create_in(self.namespaced::<PersistentVolumeClaim>(ns), manifest).await
            }
            ManifestKind::ConfigMap => Self::create_in(self.namespaced::<ConfigMap>(ns), manifest).await,
        }
    }

    async fn delete(&self, kind: ManifestKind, name: &str, namespace: &str) -> Result<Outcome, BackendError> {
        let params = DeleteParams::default();
        let ns = namespace;

        match kind {
            ManifestKind::Deployment => {
                let foreground = DeleteParams {
                    propagation_policy: Some(PropagationPolicy::Foreground),
                    grace_period_seconds: Some(DEPLOYMENT_GRACE_PERIOD_SECONDS),
                    ..DeleteParams::default()
                };
                Self::delete_in(self.namespaced::<Deployment>(ns), name, &foreground).await
            }
            ManifestKind::Namespace => Self::delete_in(self.cluster::<Namespace>(), name, &params).await,
            ManifestKind::ResourceQuota => Self::delete_in(self.namespaced::<ResourceQuota>(ns), name, &params).await,
            ManifestKind::Service => Self::delete_in(self.namespaced::<Service>(ns), name, &params).await,
            ManifestKind::ClusterRole => Self::delete_in(self.cluster::<ClusterRole>(), name, &params).await,
            ManifestKind::ClusterRoleBinding => {
                Self::delete_in(self.cluster::<ClusterRoleBinding>(), name, &params).await
            }
            ManifestKind::Ingress => Self::delete_in(self.namespaced::<Ingress>(ns), name, &params).await,
            ManifestKind::ServiceAccount => Self::delete_in(self.namespaced::<ServiceAccount>(ns), name, &params).await,
            ManifestKind::StorageClass => Self::delete_in(self.cluster::<StorageClass>(), name, &params).await,
            ManifestKind::PersistentVolumeClaim => {
                Self::delete_in(self.namespaced::<PersistentVolumeClaim>(ns), name, &params).await
            }
            ManifestKind::ConfigMap => Self::delete_in(self.namespaced::<ConfigMap>(ns), name, &params).await,
        }
    }

    async fn deployed_image(&self, name: &str, namespace: &str) -> Result<Option<String>, BackendError> {
        let api: Api<Deployment> = self.namespaced(namespace);
        let Some(deployment) = api.get_opt(name).await? else {
            return Ok(None);
        };
        Ok(deployment
            .spec
            .and_then(|spec| spec.template.spec)
            .and_then(|pod| pod.containers.into_iter().next())
            .and_then(|container| container.image))
    }

    async fn server_version(&self) -> Result<String, BackendError> {
        let info = self.client.apiserver_version().await?;
        Ok(info.git_version)
    }

    async fn service_account_token(&self, namespace: &str) -> Result<Option<String>, BackendError> {
        let api: Api<Secret> = self.namespaced(namespace);
        let secrets = api.list(&ListParams::default()).await?;
        Ok(secrets
            .items
            .into_iter()
            .find(|secret| secret.type_.as_deref() == Some(SERVICE_ACCOUNT_TOKEN_TYPE))
            .and_then(|secret| secret.metadata.name))
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodState>, BackendError> {
        let api: Api<Pod> = self.namespaced(namespace);
        let pods = api.list(&ListParams::default()).await?;

        Ok(pods
            .items
            .into_iter()
            .map(|pod| {
                let containers = pod
                    .status
                    .and_then(|status| status.container_statuses)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|status| ContainerState {
                        name: status.name,
                        ready: status.ready,
                        waiting_reason: status
                            .state
                            .and_then(|state| state.waiting)
                            .and_then(|waiting| waiting.reason),
                    })
                    .collect();
                PodState {
                    name: pod.metadata.name.unwrap_or_default(),
                    containers,
                }
            })
            .collect())
    }

    async fn read_service(&self, name: &str, namespace: &str) -> Result<Option<ServiceInfo>, BackendError> {
        let api: Api<Service> = self.namespaced(namespace);
        let Some(service) = api.get_opt(name).await? else {
            return Ok(None);
        };
        let spec = service.spec.unwrap_or_default();

        Ok(Some(ServiceInfo {
            name: name.to_string(),
            namespace: namespace.to_string(),
            cluster_ip: spec.cluster_ip,
            external_ips: spec.external_ips.unwrap_or_default(),
            external_name: spec.external_name,
            ports: spec
                .ports
                .unwrap_or_default()
                .into_iter()
                .map(|port| ServicePort {
                    name: port.name,
                    port: port.port,
                    node_port: port.node_port,
                })
                .collect(),
        }))
    }

    async fn node_internal_address(&self, node: &str) -> Result<Option<String>, BackendError> {
        let api: Api<Node> = self.cluster();
        let Some(node) = api.get_opt(node).await? else {
            return Ok(None);
        };
        Ok(node
            .status
            .and_then(|status| status.addresses)
            .unwrap_or_default()
            .into_iter()
            .find(|address| address.type_ == "InternalIP")
            .map(|address| address.address))
    }

    async fn list_storage_classes(&self) -> Result<Vec<String>, BackendError> {
        let api: Api<StorageClass> = self.cluster();
        let classes = api.list(&ListParams::default()).await?;
        Ok(classes.items.into_iter().filter_map(|sc| sc.metadata.name).collect())
    }

    async fn list_persistent_volume_claims(&self, namespace: &str) -> Result<Vec<String>, BackendError> {
        let api: Api<PersistentVolumeClaim> = self.namespaced(namespace);
        let claims = api.list(&ListParams::default()).await?;
        Ok(claims.items.into_iter().filter_map(|pvc| pvc.metadata.name).collect())
    }

    async fn exec_in_component(&self, component: &str, namespace: &str, command: &[String]) -> Result<String, BackendError> {
        let prefix = format!("{}-", component.strip_prefix("reana-").unwrap_or(component));
        let pod = self
            .list_pods(namespace)
            .await?
            .into_iter()
            .find(|pod| pod.name.starts_with(&prefix))
            .ok_or_else(|| BackendError::NotFound(format!("no pod for component {component} in {namespace}")))?;

        debug!("Executing in pod {}: {}", pod.name, command.join(" "));
        commands::run("kubectl", &commands::kubectl_exec_args(&self.kube, &pod.name, namespace, command)).await
    }

    async fn install_ingress_controller(&self) -> Result<(), BackendError> {
        let ingress = &self.config.ingress;
        info!("Installing {} in namespace {}", ingress.release_name, ingress.namespace);
        let args = commands::helm_install_args(&self.kube, ingress, &self.config.ingress_values_path());
        commands::run("helm", &args).await?;
        Ok(())
    }

    async fn uninstall_ingress_controller(&self) -> Result<(), BackendError> {
        let ingress = &self.config.ingress;
        info!("Uninstalling {} from namespace {}", ingress.release_name, ingress.namespace);
        commands::run("helm", &commands::helm_uninstall_args(&self.kube, ingress)).await?;
        Ok(())
    }
}
