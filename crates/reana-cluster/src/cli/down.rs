//! `down` command: remove the deployed cluster.

use crate::error::ClusterError;
use crate::reconciler::{self, DownOptions};
use crate::session::Session;
use clap::Args;
use tracing::info;

/// Arguments of `down`
#[derive(Args, Debug)]
pub struct DownArgs {
    /// Also uninstall the traefik ingress controller
    #[arg(long)]
    pub delete_traefik: bool,

    /// Also delete the prerequisite secrets
    #[arg(long)]
    pub delete_secrets: bool,
}

pub async fn run(session: &Session, args: DownArgs) -> Result<(), ClusterError> {
    let backend = session.connect().await?;
    let options = DownOptions {
        delete_traefik: args.delete_traefik,
        delete_secrets: args.delete_secrets,
    };
    let report = reconciler::down(&session.manifests, backend.as_ref(), options).await;
    info!(
        "Deleted {} objects ({} swept), {} already gone, {} conflicts, {} failures",
        report.deleted + report.swept,
        report.swept,
        report.already_gone,
        report.conflicts,
        report.failed
    );
    Ok(())
}
