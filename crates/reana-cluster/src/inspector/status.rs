//! Pod status of the deployed components.

use crate::config::{READY_NECESSARY_COMPONENTS, short_component_name};
use crate::error::ClusterError;
use crate::manifest::ManifestSet;
use reana_backend::{ClusterBackend, PodState};
use std::collections::BTreeMap;
use std::fmt;

/// State of a component's first pod
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentStatus {
    Running,
    /// Waiting reason reported by the container, e.g. `ContainerCreating`
    Waiting(String),
    Unavailable,
}

impl ComponentStatus {
    fn of(pod: &PodState) -> Self {
        match pod.containers.first() {
            Some(container) if container.ready => Self::Running,
            Some(container) => container
                .waiting_reason
                .clone()
                .map_or(Self::Unavailable, Self::Waiting),
            None => Self::Unavailable,
        }
    }

    pub fn is_running(&self) -> bool {
        *self == Self::Running
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str("Running"),
            Self::Waiting(reason) => f.write_str(reason),
            Self::Unavailable => f.write_str("Unavailable"),
        }
    }
}

/// Status of each expected component that has a pod.
///
/// Expected components are the Deployments of the set, or only `component`
/// when given. Components without a pod get no entry.
pub async fn get_components_status(
    manifests: &ManifestSet,
    backend: &dyn ClusterBackend,
    component: Option<&str>,
) -> Result<BTreeMap<String, ComponentStatus>, ClusterError> {
    let expected: Vec<&str> = match component {
        Some(name) => vec![short_component_name(name)],
        None => manifests.deployments().map(|m| m.name()).collect(),
    };
    let pods = backend.list_pods(&backend.config().default_namespace).await?;

    let mut statuses = BTreeMap::new();
    for name in expected {
        let prefix = format!("{name}-");
        if let Some(pod) = pods.iter().find(|p| p.name.starts_with(&prefix)) {
            statuses.insert(name.to_string(), ComponentStatus::of(pod));
        }
    }
    Ok(statuses)
}

/// Whether every reported component runs and every necessary one is reported.
///
/// With `component`, only that component is necessary.
pub fn cluster_ready(statuses: &BTreeMap<String, ComponentStatus>, component: Option<&str>) -> bool {
    let all_running = statuses.values().all(ComponentStatus::is_running);
    let all_present = match component {
        Some(name) => statuses.contains_key(short_component_name(name)),
        None => READY_NECESSARY_COMPONENTS.iter().all(|c| statuses.contains_key(*c)),
    };
    all_running && all_present
}

#[cfg(test)]
mod tests {
    use super::*;
    use reana_backend::{ContainerState, Manifest, MockClusterBackend};
    use serde_json::json;

    fn pod(name: &str, ready: bool, waiting: Option<&str>) -> PodState {
        PodState {
            name: name.to_string(),
            containers: vec![ContainerState {
                name: "main".to_string(),
                ready,
                waiting_reason: waiting.map(str::to_string),
            }],
        }
    }

    fn deployments(names: &[&str]) -> ManifestSet {
        names
            .iter()
            .map(|n| Manifest::try_from(json!({"kind": "Deployment", "metadata": {"name": n}})).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_statuses() {
        let mock = MockClusterBackend::default();
        mock.add_pod("default", pod("server-5d8f7c-abcde", true, None));
        mock.add_pod("default", pod("db-7f9c-xyz12", false, Some("ContainerCreating")));
        mock.add_pod("default", pod("cache-1234-abcd", false, None));

        let set = deployments(&["server", "db", "cache", "job-controller"]);
        let statuses = get_components_status(&set, &mock, None).await.unwrap();

        assert_eq!(statuses["server"], ComponentStatus::Running);
        assert_eq!(statuses["db"].to_string(), "ContainerCreating");
        assert_eq!(statuses["cache"], ComponentStatus::Unavailable);
        assert!(!statuses.contains_key("job-controller"));
    }

    #[tokio::test]
    async fn test_single_component() {
        let mock = MockClusterBackend::default();
        mock.add_pod("default", pod("job-controller-66b8-q2w3e", true, None));

        let statuses = get_components_status(&ManifestSet::default(), &mock, Some("reana-job-controller"))
            .await
            .unwrap();
        assert_eq!(statuses.len(), 1);
        assert!(cluster_ready(&statuses, Some("job-controller")));
        assert!(!cluster_ready(&statuses, None));
    }

    #[test]
    fn test_cluster_ready() {
        let mut statuses: BTreeMap<String, ComponentStatus> = READY_NECESSARY_COMPONENTS
            .iter()
            .map(|c| (c.to_string(), ComponentStatus::Running))
            .collect();
        assert!(cluster_ready(&statuses, None));

        statuses.insert("db".to_string(), ComponentStatus::Waiting("ErrImagePull".to_string()));
        assert!(!cluster_ready(&statuses, None));

        statuses.remove("db");
        statuses.remove("server");
        assert!(!cluster_ready(&statuses, None));
    }
}
