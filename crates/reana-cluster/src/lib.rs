//! REANA Cluster
//!
//! Deploys, verifies and tears down the REANA components on a cluster
//! backend, driven by a cluster specification file.
//!
//! - [`manifest`]: renders the resource templates into a [`ManifestSet`]
//! - [`reconciler`]: `init` and `down` against a [`ClusterBackend`](reana_backend::ClusterBackend)
//! - [`inspector`]: endpoints, pod status, image and version verification
//! - [`cli`]: the `reana-cluster` command line

pub mod cli;
pub mod config;
pub mod error;
pub mod inspector;
pub mod manifest;
pub mod output;
pub mod reconciler;
pub mod secrets;
pub mod session;

pub use error::ClusterError;
pub use manifest::{GeneratorOptions, ManifestSet, generate};
pub use session::Session;
