//! `down`: best-effort removal of the manifest set.

use crate::manifest::ManifestSet;
use crate::secrets;
use reana_backend::{BackendError, ClusterBackend, ManifestKind, Outcome};
use tracing::{info, warn};

/// Optional `down` steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownOptions {
    pub delete_traefik: bool,
    pub delete_secrets: bool,
}

/// What `down` did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownReport {
    pub deleted: usize,
    pub already_gone: usize,
    pub conflicts: usize,
    pub failed: usize,
    /// Objects removed by the `csi-cvmfs-` sweep
    pub swept: usize,
}

impl DownReport {
    fn record(&mut self, kind: ManifestKind, name: &str, result: Result<Outcome, BackendError>) {
        match result {
            Ok(Outcome::Applied) => {
                info!("Deleted {kind} {name}");
                self.deleted += 1;
            }
            Ok(Outcome::AlreadyGone) => {
                info!("{kind} {name} does not exist");
                self.already_gone += 1;
            }
            Ok(outcome) => {
                warn!("{kind} {name} was not deleted: {outcome:?}");
                self.conflicts += 1;
            }
            Err(e) => {
                warn!("Failed to delete {kind} {name}: {e}");
                self.failed += 1;
            }
        }
    }
}

/// Delete every manifest of the set, then the dynamically provisioned
/// storage, then the optional extras.
///
/// Never fails: every error is logged and counted.
pub async fn down(
    manifests: &ManifestSet,
    backend: &dyn ClusterBackend,
    options: DownOptions,
) -> DownReport {
    let config = backend.config();
    let default_namespace = config.default_namespace.as_str();
    let mut report = DownReport::default();

    for manifest in manifests {
        let Some(kind) = manifest.kind() else {
            warn!("Skipping {} {}: unsupported kind", manifest.kind_str(), manifest.name());
            continue;
        };
        let namespace = manifest.namespace_or(default_namespace);
        let result = backend.delete(kind, manifest.name(), namespace).await;
        report.record(kind, manifest.name(), result);
    }

    sweep(backend, ManifestKind::StorageClass, default_namespace, &mut report).await;
    sweep(backend, ManifestKind::PersistentVolumeClaim, default_namespace, &mut report).await;

    if options.delete_traefik {
        match backend.uninstall_ingress_controller().await {
            Ok(()) => info!("Uninstalled {}", config.ingress.release_name),
            Err(e) => warn!("Failed to uninstall {}: {}", config.ingress.release_name, e),
        }
    }

    if options.delete_secrets {
        secrets::delete_prerequisite_secrets(backend, default_namespace).await;
    }

    report
}

/// Delete the objects of `kind` whose names carry the sweep prefix
async fn sweep(
    backend: &dyn ClusterBackend,
    kind: ManifestKind,
    namespace: &str,
    report: &mut DownReport,
) {
    let prefix = &backend.config().sweep_prefix;
    let names = match kind {
        ManifestKind::StorageClass => backend.list_storage_classes().await,
        _ => backend.list_persistent_volume_claims(namespace).await,
    };
    let names = match names {
        Ok(names) => names,
        Err(e) => {
            warn!("Failed to list {kind} objects: {e}");
            return;
        }
    };

    for name in names.iter().filter(|n| n.starts_with(prefix.as_str())) {
        match backend.delete(kind, name, namespace).await {
            Ok(Outcome::Applied) => {
                info!("Deleted {kind} {name}");
                report.swept += 1;
            }
            other => report.record(kind, name, other),
        }
    }
}
