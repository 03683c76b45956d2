//! REANA Cluster Backend
//!
//! Client library for the orchestration backend REANA components are
//! deployed to. The reconciler and inspector only talk to the
//! [`ClusterBackend`] trait; [`KubernetesBackend`] is the one real
//! implementation.
//!
//! # Example
//!
//! ```no_run
//! use reana_backend::{BackendConfig, ClusterBackend, KubernetesBackend, Manifest, Outcome};
//!
//! # async fn example() -> Result<(), reana_backend::BackendError> {
//! let backend = KubernetesBackend::connect(BackendConfig::from_env(), None, None).await?;
//!
//! // Query the live version
//! let version = backend.server_version().await?;
//! println!("connected to {} {version}", backend.cluster_type());
//!
//! // Create a resource, tolerating an earlier run
//! let manifest = Manifest::try_from(serde_json::json!({
//!     "apiVersion": "v1",
//!     "kind": "Namespace",
//!     "metadata": {"name": "reana"}
//! }))?;
//! if backend.create(&manifest).await? == Outcome::AlreadyExists {
//!     println!("namespace already present");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Typed dispatch**: manifests are routed by kind to typed `k8s-openapi` APIs
//! - **Conflict outcomes**: already-exists and already-gone are results, not errors
//! - **Secret store**: named key/value secrets behind [`SecretStore`]
//! - **External tools**: `helm` for the ingress controller, `kubectl exec` into components
//! - **Mocking**: in-memory [`MockClusterBackend`] behind the `test-util` feature

pub mod commands;
pub mod config;
pub mod error;
pub mod kubernetes;
pub mod manifest;
pub mod models;
#[path = "trait.rs"]
pub mod backend_trait;
#[cfg(feature = "test-util")]
pub mod mock;

pub use backend_trait::{ClusterBackend, SecretStore};
pub use config::{BackendConfig, IngressControllerConfig};
pub use error::BackendError;
pub use kubernetes::KubernetesBackend;
pub use manifest::{Manifest, ManifestKind};
pub use models::*;
#[cfg(feature = "test-util")]
pub use mock::MockClusterBackend;
