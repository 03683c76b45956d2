//! Cluster command errors

use reana_backend::BackendError;
use reana_spec::SpecError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running a cluster command
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Specification, template or parameter file problem
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The specification file could not be loaded
    #[error(transparent)]
    Spec(#[from] SpecError),

    /// A backend call failed
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// `init` stopped at a manifest the backend refused
    #[error("Failed to create {kind} {name} (manifest #{index}): {source}")]
    Apply {
        /// Position of the manifest in the set
        index: usize,
        /// Manifest kind
        kind: String,
        /// Manifest name
        name: String,
        /// Backend failure
        source: BackendError,
    },

    /// The requested operation is not available
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// Components are missing or not running
    #[error("{0}")]
    NotReady(String),

    /// Reading or writing a local file failed
    #[error("Failed to access {path}: {source}")]
    Io {
        /// File or directory being accessed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Manifest (de)serialization failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Reading a value from the terminal failed
    #[error("Prompt failed: {0}")]
    Prompt(String),
}

impl ClusterError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
