//! reana-cluster
//!
//! Deploys REANA to a Kubernetes cluster from a cluster specification file.

use clap::Parser;
use reana_cluster::cli::{Cli, LogLevel};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides --loglevel
    let debug = cli.loglevel == LogLevel::Debug;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.loglevel.as_filter())))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(debug)
                .with_line_number(debug)
                .with_writer(std::io::stderr),
        )
        .init();

    let _ = rustls::crypto::ring::default_provider().install_default();

    cli.run().await?;
    Ok(())
}
