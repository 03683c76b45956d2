//! Command defaults and fixed component lists.

/// Specification file bundled with the crate
pub const DEFAULT_SPEC_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/configurations/reana-cluster.yaml");

/// Environment variable overriding the specification file
pub const SPEC_FILE_ENV: &str = "REANA_CLUSTER_SPEC";

/// Prefix stripped from component names when addressing services and pods
pub const COMPONENT_PREFIX: &str = "reana-";

/// Components whose URL is printed by `env`
pub const ENV_EXPORTABLE_COMPONENTS: &[&str] = &["reana-server"];

/// Components that must be running for the cluster to be ready
pub const READY_NECESSARY_COMPONENTS: &[&str] =
    &["job-controller", "message-broker", "server", "workflow-controller"];

/// Components that receive user-declared environment variables and mount points
pub const CONFIGURABLE_COMPONENTS: &[&str] = &[
    "reana-server",
    "reana-workflow-controller",
    "reana-job-controller",
    "reana-message-broker",
];

/// Components every deployment needs
pub const REQUIRED_COMPONENTS: &[&str] = &[
    "reana-server",
    "reana-workflow-controller",
    "reana-job-controller",
    "reana-message-broker",
    "reana-db",
    "reana-cache",
    "reana-workflow-engine-yadage",
    "reana-workflow-engine-cwl",
    "reana-workflow-engine-serial",
];

/// Web UI component, required when the UI is enabled
pub const UI_COMPONENT: &str = "reana-ui";

/// Node whose internal address is used as the external address
pub const LOCAL_NODE_NAME: &str = "minikube";

/// Volume receiving the service account token secret
pub const SERVICE_ACCOUNT_VOLUME: &str = "svaccount";

/// Default CephFS volume size in Gi
pub const DEFAULT_CEPHFS_VOLUME_SIZE: u32 = 200;

/// Component holding the REANA database
pub const DB_COMPONENT: &str = "db";

/// Query printing the administrator access token
pub const ADMIN_TOKEN_QUERY: &str =
    "SELECT access_token FROM user_ WHERE id_ = '00000000-0000-0000-0000-000000000000'";

/// Command run inside the database component to read the administrator token
pub fn admin_token_command() -> Vec<String> {
    ["psql", "-U", "reana", "reana", "-t", "-A", "-c", ADMIN_TOKEN_QUERY]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Strip the `reana-` prefix from a component name
pub fn short_component_name(name: &str) -> &str {
    name.strip_prefix(COMPONENT_PREFIX).unwrap_or(name)
}
