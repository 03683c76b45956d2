//! Component definitions: image, environment and mount points.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One deployable REANA component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Container image, `<name>:<tag>`
    pub image: String,

    /// User-declared environment variables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub environment: Vec<EnvironmentVariable>,

    /// User-declared mount points
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mountpoints: Vec<MountPoint>,
}

/// A single environment variable.
///
/// Written in the specification as a single-key map, `- NAME: value`.
/// Scalar values are kept as their string rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, serde_yaml::Value>",
    into = "BTreeMap<String, String>"
)]
pub struct EnvironmentVariable {
    /// Variable name
    pub name: String,
    /// Variable value
    pub value: String,
}

impl TryFrom<BTreeMap<String, serde_yaml::Value>> for EnvironmentVariable {
    type Error = String;

    fn try_from(map: BTreeMap<String, serde_yaml::Value>) -> Result<Self, Self::Error> {
        if map.len() != 1 {
            return Err(format!(
                "environment entries must hold exactly one variable, found {}",
                map.len()
            ));
        }
        let Some((name, value)) = map.into_iter().next() else {
            return Err("empty environment entry".to_string());
        };
        let value = match value {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            serde_yaml::Value::Null => String::new(),
            other => {
                return Err(format!(
                    "environment variable {name} must be a scalar, got {other:?}"
                ));
            }
        };
        Ok(Self { name, value })
    }
}

impl From<EnvironmentVariable> for BTreeMap<String, String> {
    fn from(var: EnvironmentVariable) -> Self {
        BTreeMap::from([(var.name, var.value)])
    }
}

/// A host path mounted into a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountPoint {
    /// Volume type; only `hostPath` is supported
    #[serde(rename = "type")]
    pub kind: String,
    /// Volume name
    pub name: String,
    /// `<host path>:<mount path>`
    pub path: String,
}

impl MountPoint {
    /// Host side of `path`
    pub fn host_path(&self) -> Option<&str> {
        self.path.split_once(':').map(|(host, _)| host)
    }

    /// Container side of `path`
    pub fn mount_path(&self) -> Option<&str> {
        self.path.split_once(':').map(|(_, mount)| mount)
    }
}
