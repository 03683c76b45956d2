//! Specification errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating a cluster specification
#[derive(Debug, Error)]
pub enum SpecError {
    /// The specification file could not be read
    #[error("Failed to read specification file {path}: {source}")]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The specification is not valid YAML or does not match the model
    #[error("Malformed specification: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The specification parsed but violates a validation rule
    #[error("Invalid REANA cluster specification: {0}")]
    Validation(String),

    /// A component required by the caller is not declared
    #[error("Component {0} is not declared in the specification")]
    MissingComponent(String),
}
