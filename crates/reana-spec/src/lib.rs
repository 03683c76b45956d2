//! REANA Cluster Specification
//!
//! Typed model of the REANA cluster specification file: the `cluster` block
//! (backend type, target version, kube-config, storage and feature flags)
//! and the `components` map (image, environment, mount points).
//!
//! # Example
//!
//! ```no_run
//! use reana_spec::load_spec_file;
//!
//! # fn example() -> Result<(), reana_spec::SpecError> {
//! let spec = load_spec_file("reana-cluster.yaml", false)?;
//! let server = spec.component("reana-server")?;
//! println!("server image: {}", server.image);
//! # Ok(())
//! # }
//! ```

pub mod cluster;
pub mod component;
pub mod error;
pub mod load;

pub use cluster::*;
pub use component::*;
pub use error::SpecError;
pub use load::{SUPPORTED_BACKENDS, load_spec_file, parse_spec, validate};
