//! Component URLs from resolved endpoints.

/// Build the URL a client reaches a component at.
///
/// Secure URLs use `https` on port `443`, or on a port ending in `443`
/// (a node port such as `30443`). Without a secure port, or when `insecure`
/// is set, the first port is used with `http`. `None` when there are no
/// ports.
pub fn build_component_url(host: &str, ports: &[String], insecure: bool) -> Option<String> {
    let secure = ports.iter().find(|p| p.ends_with("443")).filter(|_| !insecure);
    if let Some(port) = secure {
        return Some(format!("https://{host}:{port}"));
    }
    ports.first().map(|port| format!("http://{host}:{port}"))
}
