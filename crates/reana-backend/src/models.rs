//! Backend result and read models

use serde::{Deserialize, Serialize};

/// Result of a create or delete that reached the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The object was created or deleted
    Applied,
    /// Create found the object already present
    AlreadyExists,
    /// Delete found the object already absent
    AlreadyGone,
    /// Delete was refused because of a conflicting state
    Conflict,
}

/// Pod listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodState {
    /// Pod name, prefixed with the owning deployment's name
    pub name: String,
    /// Container statuses in declaration order
    pub containers: Vec<ContainerState>,
}

/// Container status inside a pod
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerState {
    pub name: String,
    /// Whether the readiness probe passes
    pub ready: bool,
    /// Reason reported while the container is waiting, e.g. `ContainerCreating`
    pub waiting_reason: Option<String>,
}

/// Service as read from the backend
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// Service name
    pub name: String,
    /// Namespace the service lives in
    pub namespace: String,
    /// Cluster-internal IP, `None` for headless services
    pub cluster_ip: Option<String>,
    /// Externally reachable IPs
    pub external_ips: Vec<String>,
    /// DNS name of `ExternalName` services
    pub external_name: Option<String>,
    /// Exposed ports in declaration order
    pub ports: Vec<ServicePort>,
}

/// One service port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    /// Port name, e.g. `http`
    pub name: Option<String>,
    /// Port the service listens on
    pub port: i32,
    /// Port opened on every node for `NodePort` services
    pub node_port: Option<i32>,
}
