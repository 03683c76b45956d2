//! `status` command: report component readiness.

use super::table::print_table;
use crate::error::ClusterError;
use crate::inspector::{self, ComponentStatus};
use crate::session::Session;
use clap::Args;
use std::collections::BTreeMap;

/// Arguments of `status`
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only report this component, e.g. `job-controller`
    #[arg(long)]
    pub component: Option<String>,
}

pub async fn run(session: &Session, args: StatusArgs) -> Result<(), ClusterError> {
    let backend = session.connect().await?;
    let component = args.component.as_deref();
    let statuses = inspector::get_components_status(&session.manifests, backend.as_ref(), component).await?;

    print_table(&["component", "status"], rows(&statuses));
    let summary = summary(&statuses, component);
    if inspector::cluster_ready(&statuses, component) {
        println!("{summary}");
        Ok(())
    } else {
        Err(ClusterError::NotReady(summary))
    }
}

fn rows(statuses: &BTreeMap<String, ComponentStatus>) -> impl Iterator<Item = Vec<String>> + '_ {
    statuses
        .iter()
        .map(|(name, status)| vec![name.clone(), status.to_string()])
}

fn summary(statuses: &BTreeMap<String, ComponentStatus>, component: Option<&str>) -> String {
    let ready = inspector::cluster_ready(statuses, component);
    match (component, ready) {
        (Some(name), true) => format!("REANA component {name} is ready."),
        (Some(name), false) => format!("REANA component {name} is not ready."),
        (None, true) => "REANA cluster is ready.".to_string(),
        (None, false) => "REANA cluster is not ready.".to_string(),
    }
}
