//! `init`: deploy every manifest of the set.

use crate::config::SERVICE_ACCOUNT_VOLUME;
use crate::error::ClusterError;
use crate::manifest::ManifestSet;
use crate::secrets::{self, SecretValues};
use reana_backend::{ClusterBackend, Manifest, ManifestKind, Outcome};
use serde_json::json;
use tracing::{debug, info, warn};

/// Optional `init` steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitOptions {
    /// Do not create the prerequisite secrets
    pub skip_secret_creation: bool,
    /// Install the ingress controller release first
    pub traefik: bool,
}

/// What `init` did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitReport {
    pub created: usize,
    pub already_existed: usize,
    /// Manifests of a kind the backend cannot create
    pub skipped: usize,
}

/// Deploy the manifests in order.
///
/// Already-existing objects are not an error. Any other failure stops the
/// run and is returned with the position, kind and name of the manifest.
pub async fn init(
    manifests: &ManifestSet,
    backend: &dyn ClusterBackend,
    values: &mut dyn SecretValues,
    options: InitOptions,
) -> Result<InitReport, ClusterError> {
    let namespace = backend.config().default_namespace.clone();

    if options.skip_secret_creation {
        debug!("Skipping prerequisite secret creation");
    } else {
        secrets::create_prerequisite_secrets(backend, values, &namespace).await?;
    }

    if options.traefik {
        install_traefik(backend).await?;
    }

    let mut token: Option<Option<String>> = None;
    let mut report = InitReport::default();

    for (index, manifest) in manifests.iter().enumerate() {
        debug!("{}", serde_json::to_string(manifest.as_value()).unwrap_or_default());

        let Some(kind) = manifest.kind() else {
            warn!("Skipping {} {}: unsupported kind", manifest.kind_str(), manifest.name());
            report.skipped += 1;
            continue;
        };

        let injected;
        let mut target = manifest;
        if kind == ManifestKind::Deployment && manifest.volume_names().contains(&SERVICE_ACCOUNT_VOLUME) {
            if token.is_none() {
                token = Some(backend.service_account_token(&namespace).await.map_err(|source| {
                    ClusterError::Apply {
                        index,
                        kind: kind.to_string(),
                        name: manifest.name().to_string(),
                        source,
                    }
                })?);
            }
            match token.as_ref().and_then(Option::as_deref) {
                Some(secret) => {
                    injected = inject_service_account_token(manifest, secret);
                    target = &injected;
                }
                None => warn!("No service account token found in {namespace}, deploying {} as rendered", manifest.name()),
            }
        }

        match backend.create(target).await {
            Ok(Outcome::AlreadyExists) => {
                info!("{} {} already exists", kind, manifest.name());
                report.already_existed += 1;
            }
            Ok(_) => {
                info!("Created {} {}", kind, manifest.name());
                report.created += 1;
            }
            Err(source) => {
                return Err(ClusterError::Apply {
                    index,
                    kind: kind.to_string(),
                    name: manifest.name().to_string(),
                    source,
                });
            }
        }
    }

    Ok(report)
}

async fn install_traefik(backend: &dyn ClusterBackend) -> Result<(), ClusterError> {
    let ingress = &backend.config().ingress;
    if backend.read_service(&ingress.release_name, &ingress.namespace).await?.is_some() {
        info!("{} is already installed", ingress.release_name);
        return Ok(());
    }
    backend.install_ingress_controller().await?;
    Ok(())
}

/// Point the `svaccount` volume of a Deployment at the service account token secret.
///
/// Returns a new manifest; other volumes and manifests without the volume
/// are unchanged.
pub fn inject_service_account_token(manifest: &Manifest, secret_name: &str) -> Manifest {
    let mut injected = manifest.clone();
    if let Some(volumes) = injected.pod_volumes_mut() {
        for volume in volumes
            .iter_mut()
            .filter(|v| v.get("name").and_then(|n| n.as_str()) == Some(SERVICE_ACCOUNT_VOLUME))
        {
            volume["secret"]["secretName"] = json!(secret_name);
        }
    }
    injected
}
