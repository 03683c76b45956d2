//! Backend client errors

use thiserror::Error;

/// Errors that can occur when interacting with the cluster backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend API rejected a request
    #[error("Backend API error ({code}): {message}")]
    Api {
        /// HTTP status code returned by the API
        code: u16,
        /// Message returned by the API
        message: String,
    },

    /// Transport or client-side Kubernetes error
    #[error("Kubernetes error: {0}")]
    Kube(kube::Error),

    /// A resource the operation depends on does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A manifest cannot be understood
    #[error("Invalid manifest: {0}")]
    Manifest(String),

    /// JSON conversion between manifest and typed object failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An external command exited unsuccessfully
    #[error("{program} exited with status {status}: {stderr}")]
    Command {
        /// Program that was run
        program: String,
        /// Exit code, -1 when killed by a signal
        status: i32,
        /// Captured standard error
        stderr: String,
    },

    /// An external command could not be started
    #[error("Failed to run {program}: {source}")]
    Io {
        /// Program that was being started
        program: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Client configuration (kubeconfig, context) is unusable
    #[error("Invalid backend configuration: {0}")]
    Config(String),
}

impl BackendError {
    /// HTTP status code of an API error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<kube::Error> for BackendError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(ae) => Self::Api {
                code: ae.code,
                message: ae.message.clone(),
            },
            other => Self::Kube(other),
        }
    }
}
