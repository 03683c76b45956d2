//! Writing generated manifests to disk.
//!
//! Layout: `<dir>/<kind-lowercase>s/<name>-manifest.yaml`.

use crate::error::ClusterError;
use crate::manifest::ManifestSet;
use reana_backend::Manifest;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Path a manifest is written to under `dir`
pub fn manifest_path(dir: &Path, manifest: &Manifest) -> PathBuf {
    dir.join(format!("{}s", manifest.kind_str().to_lowercase()))
        .join(format!("{}-manifest.yaml", manifest.name()))
}

/// Write every manifest of the set, creating directories on demand
pub fn write_manifests(manifests: &ManifestSet, dir: &Path) -> Result<Vec<PathBuf>, ClusterError> {
    info!("Writing deployable REANA cluster configuration to {}", dir.display());

    let mut written = Vec::with_capacity(manifests.len());
    for manifest in manifests {
        let path = manifest_path(dir, manifest);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClusterError::io(parent, e))?;
        }
        let yaml = serde_yaml::to_string(manifest)?;
        std::fs::write(&path, yaml).map_err(|e| ClusterError::io(&path, e))?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Read back a manifest written by [`write_manifests`]
pub fn read_manifest(path: &Path) -> Result<Manifest, ClusterError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ClusterError::io(path, e))?;
    Ok(serde_yaml::from_str(&contents)?)
}
