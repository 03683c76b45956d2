//! Template context: parameter file values, feature flags and components.

use super::GeneratorOptions;
use crate::config::{
    CONFIGURABLE_COMPONENTS, DEFAULT_CEPHFS_VOLUME_SIZE, REQUIRED_COMPONENTS, UI_COMPONENT,
    short_component_name,
};
use crate::error::ClusterError;
use reana_spec::{ClusterSpecification, ComponentSpec};
use serde_json::{Map, Value, json};

/// Merge the parameter file with the specification and runtime flags.
///
/// Flags and specification values override parameter file defaults. For
/// CephFS settings the specification wins over the flags.
pub fn build_context(
    spec: &ClusterSpecification,
    options: &GeneratorOptions,
    mut parameters: Map<String, Value>,
) -> Result<Value, ClusterError> {
    let cluster = &spec.cluster;

    let cephfs = options.cephfs || cluster.reana_cephfs;
    parameters.insert("CEPHFS".into(), json!(cephfs));
    if cephfs {
        let size = cluster
            .cephfs_volume_size
            .or(options.cephfs_volume_size)
            .map(Value::from)
            .or_else(|| parameters.get("CEPHFS_VOLUME_SIZE").cloned())
            .unwrap_or_else(|| json!(DEFAULT_CEPHFS_VOLUME_SIZE));
        parameters.insert("CEPHFS_VOLUME_SIZE".into(), size);

        let overrides = [
            ("CEPHFS_STORAGECLASS", &cluster.cephfs_storageclass, &options.cephfs_storageclass),
            ("CEPHFS_OS_SHARE_ID", &cluster.cephfs_os_share_id, &options.cephfs_os_share_id),
            (
                "CEPHFS_OS_SHARE_ACCESS_ID",
                &cluster.cephfs_os_share_access_id,
                &options.cephfs_os_share_access_id,
            ),
        ];
        for (key, from_spec, from_flag) in overrides {
            if let Some(value) = from_spec.as_ref().or(from_flag.as_ref()) {
                parameters.insert(key.into(), json!(value));
            } else {
                parameters.entry(key).or_insert_with(|| json!(""));
            }
        }
    }

    let ui = options.ui || cluster.ui;
    parameters.insert("CVMFS".into(), json!(options.cvmfs || cluster.cvmfs));
    parameters.insert("DEBUG".into(), json!(options.debug || cluster.debug));
    parameters.insert("UI".into(), json!(ui));

    if let Some(url) = options.url.as_ref().or(cluster.reana_url.as_ref()) {
        parameters.insert("REANA_URL".into(), json!(url));
    }
    parameters.insert("ROOT_PATH".into(), json!(cluster.root_path));
    parameters.insert("SHARED_VOLUME_PATH".into(), json!(cluster.shared_volume_path));

    let required = REQUIRED_COMPONENTS.iter().copied().chain(ui.then_some(UI_COMPONENT));
    for name in required {
        if !spec.components.contains_key(name) {
            return Err(ClusterError::configuration(format!(
                "component {name} is missing from the cluster specification"
            )));
        }
    }

    let components: Map<String, Value> = spec
        .components
        .iter()
        .map(|(name, component)| (template_key(name), component_context(name, component)))
        .collect();
    parameters.insert("components".into(), Value::Object(components));

    Ok(Value::Object(parameters))
}

/// `reana-workflow-controller` -> `workflow_controller`
fn template_key(name: &str) -> String {
    short_component_name(name).replace('-', "_")
}

fn component_context(name: &str, component: &ComponentSpec) -> Value {
    if !CONFIGURABLE_COMPONENTS.contains(&name) {
        return json!({
            "image": component.image,
            "environment": [],
            "mountpoints": [],
        });
    }

    let environment: Vec<Value> = component
        .environment
        .iter()
        .map(|var| json!({"name": var.name, "value": var.value}))
        .collect();
    let mountpoints: Vec<Value> = component
        .mountpoints
        .iter()
        .map(|mount| {
            json!({
                "name": mount.name,
                "host_path": mount.host_path().unwrap_or_default(),
                "mount_path": mount.mount_path().unwrap_or_default(),
            })
        })
        .collect();

    json!({
        "image": component.image,
        "environment": environment,
        "mountpoints": mountpoints,
    })
}
