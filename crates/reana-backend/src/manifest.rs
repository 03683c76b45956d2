//! Rendered resource manifests.
//!
//! A [`Manifest`] keeps the rendered document as an untyped JSON value so it
//! can be written back out unchanged; it is converted into the typed
//! `k8s-openapi` object only at dispatch time.

use crate::error::BackendError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource kinds the backend can create and delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ManifestKind {
    /// apps/v1 Deployment
    Deployment,
    /// v1 Namespace
    Namespace,
    /// v1 ResourceQuota
    ResourceQuota,
    /// v1 Service
    Service,
    /// rbac/v1 ClusterRole
    ClusterRole,
    /// rbac/v1 ClusterRoleBinding
    ClusterRoleBinding,
    /// networking/v1 Ingress
    Ingress,
    /// v1 ServiceAccount
    ServiceAccount,
    /// storage/v1 StorageClass
    StorageClass,
    /// v1 PersistentVolumeClaim
    PersistentVolumeClaim,
    /// v1 ConfigMap
    ConfigMap,
}

impl ManifestKind {
    /// Every supported kind
    pub const ALL: [ManifestKind; 11] = [
        Self::Deployment,
        Self::Namespace,
        Self::ResourceQuota,
        Self::Service,
        Self::ClusterRole,
        Self::ClusterRoleBinding,
        Self::Ingress,
        Self::ServiceAccount,
        Self::StorageClass,
        Self::PersistentVolumeClaim,
        Self::ConfigMap,
    ];

    /// Kind name as written in manifests
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::Namespace => "Namespace",
            Self::ResourceQuota => "ResourceQuota",
            Self::Service => "Service",
            Self::ClusterRole => "ClusterRole",
            Self::ClusterRoleBinding => "ClusterRoleBinding",
            Self::Ingress => "Ingress",
            Self::ServiceAccount => "ServiceAccount",
            Self::StorageClass => "StorageClass",
            Self::PersistentVolumeClaim => "PersistentVolumeClaim",
            Self::ConfigMap => "ConfigMap",
        }
    }

    /// Whether objects of this kind live inside a namespace
    pub fn is_namespaced(self) -> bool {
        !matches!(
            self,
            Self::Namespace | Self::ClusterRole | Self::ClusterRoleBinding | Self::StorageClass
        )
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManifestKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BackendError::Manifest(format!("unsupported kind {s}")))
    }
}

/// One rendered resource manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub struct Manifest(serde_json::Value);

impl TryFrom<serde_json::Value> for Manifest {
    type Error = BackendError;

    /// Accept a document with a string `kind` and `metadata.name`
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value.get("kind") {
            Some(serde_json::Value::String(kind)) if !kind.is_empty() => {}
            _ => return Err(BackendError::Manifest("document has no kind".to_string())),
        }
        if value.pointer("/metadata/name").and_then(|n| n.as_str()).is_none() {
            return Err(BackendError::Manifest(
                "document has no metadata.name".to_string(),
            ));
        }
        Ok(Self(value))
    }
}

impl From<Manifest> for serde_json::Value {
    fn from(manifest: Manifest) -> Self {
        manifest.0
    }
}

impl Manifest {
    /// Kind as written in the document
    pub fn kind_str(&self) -> &str {
        self.0.get("kind").and_then(|k| k.as_str()).unwrap_or_default()
    }

    /// Supported kind, `None` for anything else
    pub fn kind(&self) -> Option<ManifestKind> {
        self.kind_str().parse().ok()
    }

    /// `metadata.name`
    pub fn name(&self) -> &str {
        self.0
            .pointer("/metadata/name")
            .and_then(|n| n.as_str())
            .unwrap_or_default()
    }

    /// `metadata.namespace`, if set
    pub fn namespace(&self) -> Option<&str> {
        self.0.pointer("/metadata/namespace").and_then(|n| n.as_str())
    }

    /// `metadata.namespace`, or `default` when unset
    pub fn namespace_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.namespace().unwrap_or(default)
    }

    /// Image of the first pod-template container
    pub fn container_image(&self) -> Option<&str> {
        self.0
            .pointer("/spec/template/spec/containers/0/image")
            .and_then(|i| i.as_str())
    }

    /// Names of the pod-template volumes
    pub fn volume_names(&self) -> Vec<&str> {
        self.0
            .pointer("/spec/template/spec/volumes")
            .and_then(|v| v.as_array())
            .map(|volumes| {
                volumes
                    .iter()
                    .filter_map(|v| v.get("name").and_then(|n| n.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Pod-template volumes, for transforms that rewrite volume sources
    pub fn pod_volumes_mut(&mut self) -> Option<&mut Vec<serde_json::Value>> {
        self.0
            .pointer_mut("/spec/template/spec/volumes")
            .and_then(|v| v.as_array_mut())
    }

    /// Borrow the document
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Convert into a typed API object
    pub fn to_resource<K: DeserializeOwned>(&self) -> Result<K, BackendError> {
        Ok(serde_json::from_value(self.0.clone())?)
    }
}
