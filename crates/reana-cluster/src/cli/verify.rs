//! `verify` command: check the backend version and deployed images.

use super::table::print_table;
use crate::error::ClusterError;
use crate::inspector;
use crate::session::Session;
use clap::{Args, Subcommand};

/// Arguments of `verify`; both checks run when no target is given
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(subcommand)]
    pub target: Option<VerifyTarget>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyTarget {
    /// Only compare the backend version with the specification
    Backend,
    /// Only compare the deployed images with the specification
    Components,
}

pub async fn run(session: &Session, args: VerifyArgs) -> Result<(), ClusterError> {
    let backend = session.connect().await?;

    if matches!(args.target, None | Some(VerifyTarget::Backend)) {
        let result = inspector::verify_backend(&session.spec, backend.as_ref()).await?;
        print_table(
            &["kubernetes version", "is compatible"],
            [vec![result.current_version, result.is_compatible.to_string()]],
        );
    }

    if matches!(args.target, None | Some(VerifyTarget::Components)) {
        let results = inspector::verify_components(&session.manifests, backend.as_ref()).await?;
        let rows = results.into_iter().map(|(name, matches)| {
            let image = if matches { "match" } else { "mismatch" };
            vec![name, image.to_string()]
        });
        print_table(&["component", "image"], rows);
    }

    Ok(())
}
