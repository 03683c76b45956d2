//! `init` command: deploy the cluster.

use crate::error::ClusterError;
use crate::output;
use crate::reconciler::{self, InitOptions};
use crate::secrets::InteractiveSecretValues;
use crate::session::Session;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Arguments of `init`
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Only generate the manifests, do not deploy them
    #[arg(long)]
    pub skip_initialization: bool,

    /// Do not create the prerequisite secrets
    #[arg(long)]
    pub skip_secret_creation: bool,

    /// Folder the generated manifests are written to
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Install the traefik ingress controller before deploying
    #[arg(long)]
    pub traefik: bool,
}

pub async fn run(session: &Session, args: InitArgs) -> Result<(), ClusterError> {
    if !args.skip_initialization {
        let backend = session.connect().await?;
        let options = InitOptions {
            skip_secret_creation: args.skip_secret_creation,
            traefik: args.traefik,
        };
        let report = reconciler::init(
            &session.manifests,
            backend.as_ref(),
            &mut InteractiveSecretValues,
            options,
        )
        .await?;
        info!(
            "Created {} objects, {} already existed, {} skipped",
            report.created, report.already_existed, report.skipped
        );
    }

    if let Some(dir) = &args.output {
        output::write_manifests(&session.manifests, dir)?;
    }

    println!("Init complete");
    Ok(())
}
