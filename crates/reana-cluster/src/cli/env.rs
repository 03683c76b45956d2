//! `env` command: print shell exports for the client.

use crate::config::ENV_EXPORTABLE_COMPONENTS;
use crate::error::ClusterError;
use crate::inspector;
use crate::session::Session;
use clap::Args;
use reana_backend::ClusterBackend;

/// Arguments of `env`
#[derive(Args, Debug)]
pub struct EnvArgs {
    /// Namespace of the components
    #[arg(long, default_value = "default")]
    pub namespace: String,

    /// Print `http` URLs
    #[arg(long)]
    pub insecure_url: bool,

    /// Also print the administrator access token
    #[arg(long)]
    pub include_admin_token: bool,
}

pub async fn run(session: &Session, args: EnvArgs) -> Result<(), ClusterError> {
    let backend = session.connect().await?;
    for line in export_lines(backend.as_ref(), &args).await? {
        println!("{line}");
    }
    Ok(())
}

/// `REANA_SERVER_URL` for `reana-server`
fn variable_name(component: &str) -> String {
    format!("{}_URL", component.to_uppercase().replace('-', "_"))
}

async fn export_lines(backend: &dyn ClusterBackend, args: &EnvArgs) -> Result<Vec<String>, ClusterError> {
    let mut lines = Vec::new();
    for component in ENV_EXPORTABLE_COMPONENTS {
        let url = inspector::component_url(backend, component, &args.namespace, args.insecure_url).await?;
        lines.push(format!("export {}={url}", variable_name(component)));
    }
    if args.include_admin_token {
        let token = inspector::admin_access_token(backend, &args.namespace).await?;
        lines.push(format!("export REANA_ACCESS_TOKEN={token}"));
    }
    Ok(lines)
}
