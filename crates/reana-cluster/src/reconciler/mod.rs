//! Reconciler: applies a manifest set to a backend or removes it.
//!
//! `init` walks the set in order and stops at the first real failure;
//! `down` is best effort and never fails.

mod down;
mod init;

pub use down::{DownOptions, DownReport, down};
pub use init::{InitOptions, InitReport, init, inject_service_account_token};
