//! `reana-cluster` command line.

mod down;
mod env;
mod get;
mod init;
mod status;
mod table;
mod verify;

use crate::config::{DEFAULT_SPEC_FILE, SPEC_FILE_ENV};
use crate::error::ClusterError;
use crate::manifest::GeneratorOptions;
use crate::session::Session;
use clap::{Args, Parser, Subcommand, ValueEnum};
use reana_backend::BackendConfig;
use std::path::PathBuf;
use tracing::debug;

/// Command line application for managing a REANA cluster
#[derive(Parser, Debug)]
#[command(name = "reana-cluster")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// REANA cluster specification file describing the cluster and its components
    #[arg(short = 'f', long = "file", env = SPEC_FILE_ENV, default_value = DEFAULT_SPEC_FILE)]
    pub file: PathBuf,

    /// Log level
    #[arg(short = 'l', long, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Do not validate the specification file
    #[arg(short = 's', long)]
    pub skip_validation: bool,

    /// Folder holding the resource templates
    #[arg(long)]
    pub templates_dir: Option<PathBuf>,

    #[command(flatten)]
    pub features: FeatureArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Log levels accepted by `--loglevel`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    /// Default directive for the tracing filter
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Feature flags merged into the specification when generating manifests
#[derive(Args, Debug, Clone, Default)]
pub struct FeatureArgs {
    /// Back the shared volume with CephFS
    #[arg(long)]
    pub cephfs: bool,

    /// CephFS volume size in Gi
    #[arg(long)]
    pub cephfs_volume_size: Option<u32>,

    /// CephFS storage class
    #[arg(long)]
    pub cephfs_storageclass: Option<String>,

    /// CephFS OpenStack share id
    #[arg(long)]
    pub cephfs_os_share_id: Option<String>,

    /// CephFS OpenStack share access id
    #[arg(long)]
    pub cephfs_os_share_access_id: Option<String>,

    /// Mount the CVMFS repositories
    #[arg(long)]
    pub cvmfs: bool,

    /// Deploy components in debug mode
    #[arg(long)]
    pub debug: bool,

    /// Deploy the web UI
    #[arg(long)]
    pub ui: bool,

    /// Public URL of the cluster
    #[arg(long)]
    pub url: Option<String>,
}

impl From<FeatureArgs> for GeneratorOptions {
    fn from(args: FeatureArgs) -> Self {
        Self {
            cephfs: args.cephfs,
            cephfs_volume_size: args.cephfs_volume_size,
            cephfs_storageclass: args.cephfs_storageclass,
            cephfs_os_share_id: args.cephfs_os_share_id,
            cephfs_os_share_access_id: args.cephfs_os_share_access_id,
            cvmfs: args.cvmfs,
            debug: args.debug,
            ui: args.ui,
            url: args.url,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy all REANA components to the cluster
    Init(init::InitArgs),
    /// Delete all deployed components
    Down(down::DownArgs),
    /// Show the addresses and ports of a deployed component
    Get(get::GetArgs),
    /// Print the environment needed by the REANA client
    Env(env::EnvArgs),
    /// Restart the components (not supported)
    Restart,
    /// Show the status of each component and whether the cluster is ready
    Status(status::StatusArgs),
    /// Verify the cluster and its components against the specification
    Verify(verify::VerifyArgs),
}

impl Cli {
    /// Backend configuration from the environment and `--templates-dir`
    pub fn backend_config(&self) -> BackendConfig {
        let config = BackendConfig::from_env();
        match &self.templates_dir {
            Some(dir) => config.with_templates_folder(dir),
            None => config,
        }
    }

    /// Run the CLI command
    pub async fn run(self) -> Result<(), ClusterError> {
        if matches!(self.command, Commands::Restart) {
            return Err(ClusterError::Unsupported("restart".to_string()));
        }

        let config = self.backend_config();
        debug!("Loading {}", self.file.display());
        let session = Session::load(&self.file, self.skip_validation, &self.features.into(), config)?;

        match self.command {
            Commands::Init(args) => init::run(&session, args).await,
            Commands::Down(args) => down::run(&session, args).await,
            Commands::Get(args) => get::run(&session, args).await,
            Commands::Env(args) => env::run(&session, args).await,
            Commands::Status(args) => status::run(&session, args).await,
            Commands::Verify(args) => verify::run(&session, args).await,
            Commands::Restart => Err(ClusterError::Unsupported("restart".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_before_command() {
        let cli = Cli::try_parse_from([
            "reana-cluster",
            "-f",
            "cluster.yaml",
            "-l",
            "debug",
            "--cephfs",
            "--cephfs-volume-size",
            "50",
            "--url",
            "reana.example.org",
            "init",
            "--traefik",
            "-o",
            "out",
        ])
        .unwrap();

        assert_eq!(cli.file, PathBuf::from("cluster.yaml"));
        assert_eq!(cli.loglevel, LogLevel::Debug);
        let options = GeneratorOptions::from(cli.features.clone());
        assert!(options.cephfs);
        assert_eq!(options.cephfs_volume_size, Some(50));
        assert_eq!(options.url.as_deref(), Some("reana.example.org"));
        match cli.command {
            Commands::Init(args) => {
                assert!(args.traefik);
                assert_eq!(args.output, Some(PathBuf::from("out")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_warning_alias() {
        let cli = Cli::try_parse_from(["reana-cluster", "-l", "warning", "status"]).unwrap();
        assert_eq!(cli.loglevel, LogLevel::Warn);
    }

    #[test]
    fn test_templates_dir_override() {
        let cli = Cli::try_parse_from(["reana-cluster", "--templates-dir", "/tmp/templates", "down"]).unwrap();
        assert_eq!(cli.backend_config().templates_folder, PathBuf::from("/tmp/templates"));
    }

    #[test]
    fn test_verify_subcommands() {
        let cli = Cli::try_parse_from(["reana-cluster", "verify", "backend"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Verify(verify::VerifyArgs { target: Some(verify::VerifyTarget::Backend) })
        ));
        let cli = Cli::try_parse_from(["reana-cluster", "verify"]).unwrap();
        assert!(matches!(cli.command, Commands::Verify(verify::VerifyArgs { target: None })));
    }

    #[tokio::test]
    async fn test_restart_is_unsupported() {
        let cli = Cli::try_parse_from(["reana-cluster", "-f", "/nonexistent.yaml", "restart"]).unwrap();
        assert!(matches!(cli.run().await, Err(ClusterError::Unsupported(_))));
    }
}
