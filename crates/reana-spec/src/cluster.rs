//! Root document and `cluster` block of the specification.

use crate::component::ComponentSpec;
use crate::error::SpecError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default host and mount path of the shared REANA volume
pub const DEFAULT_SHARED_VOLUME_PATH: &str = "/var/reana";

/// Complete REANA cluster specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpecification {
    /// Backend and feature settings
    pub cluster: ClusterSettings,

    /// Component name (e.g. `reana-server`) to component definition
    #[serde(default)]
    pub components: BTreeMap<String, ComponentSpec>,
}

impl ClusterSpecification {
    /// Look up a component by its full name
    pub fn component(&self, name: &str) -> Result<&ComponentSpec, SpecError> {
        self.components
            .get(name)
            .ok_or_else(|| SpecError::MissingComponent(name.to_string()))
    }
}

/// The `cluster` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSettings {
    /// Backend key, e.g. `kubernetes`
    #[serde(rename = "type")]
    pub backend: String,

    /// Backend version the deployment targets, e.g. `v1.16.3`
    pub version: String,

    /// Kube-config file; the client default is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PathBuf>,

    /// Kube-config context; the current context is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_context: Option<String>,

    /// Public URL of the deployment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reana_url: Option<String>,

    /// Run components in debug mode
    #[serde(default)]
    pub debug: bool,

    /// Deploy the web UI component
    #[serde(default)]
    pub ui: bool,

    /// Host path backing the shared volume
    #[serde(default = "default_shared_volume_path")]
    pub root_path: String,

    /// Mount path of the shared volume inside components
    #[serde(default = "default_shared_volume_path")]
    pub shared_volume_path: String,

    /// Mount CVMFS repositories into workflow jobs
    #[serde(default)]
    pub cvmfs: bool,

    /// Back the shared volume with CephFS
    #[serde(default)]
    pub reana_cephfs: bool,

    /// CephFS volume size in Gi
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cephfs_volume_size: Option<u32>,

    /// CephFS storage class name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cephfs_storageclass: Option<String>,

    /// OpenStack Manila share id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cephfs_os_share_id: Option<String>,

    /// OpenStack Manila share access id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cephfs_os_share_access_id: Option<String>,
}

fn default_shared_volume_path() -> String {
    DEFAULT_SHARED_VOLUME_PATH.to_string()
}
