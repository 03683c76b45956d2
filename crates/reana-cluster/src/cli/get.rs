//! `get` command: show where a component is reachable.

use crate::error::ClusterError;
use crate::inspector::{self, ComponentEndpoint};
use crate::session::Session;
use clap::Args;

/// Arguments of `get`
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Component name, with or without the `reana-` prefix
    pub component: String,

    /// Namespace of the component
    #[arg(long, default_value = "default")]
    pub namespace: String,
}

pub async fn run(session: &Session, args: GetArgs) -> Result<(), ClusterError> {
    let backend = session.connect().await?;
    let endpoint = inspector::get_component(backend.as_ref(), &args.component, &args.namespace).await?;
    for line in endpoint_lines(&endpoint) {
        println!("{line}");
    }
    Ok(())
}

fn endpoint_lines(endpoint: &ComponentEndpoint) -> Vec<String> {
    vec![
        format!("internal_ip: {}", endpoint.internal_ip.as_deref().unwrap_or_default()),
        format!("ports: {}", endpoint.ports.join(", ")),
        format!("external_ip_s: {}", endpoint.external_ips.join(", ")),
        format!("external_name: {}", endpoint.external_name.as_deref().unwrap_or_default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_lines() {
        let endpoint = ComponentEndpoint {
            internal_ip: Some("10.96.0.12".to_string()),
            external_ips: vec!["192.168.39.2".to_string()],
            ports: vec!["30080".to_string(), "30443".to_string()],
            external_name: None,
        };
        assert_eq!(
            endpoint_lines(&endpoint),
            vec![
                "internal_ip: 10.96.0.12",
                "ports: 30080, 30443",
                "external_ip_s: 192.168.39.2",
                "external_name: ",
            ]
        );
    }
}
