//! External tools: `helm` for the ingress controller, `kubectl exec` into pods.
//!
//! Commands block until the child exits. There is no timeout.

use crate::config::IngressControllerConfig;
use crate::error::BackendError;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Kubeconfig selection forwarded to the command-line tools
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubeContext {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

impl KubeContext {
    fn kubectl_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(path) = &self.kubeconfig {
            args.push(format!("--kubeconfig={}", path.display()));
        }
        if let Some(context) = &self.context {
            args.push(format!("--context={context}"));
        }
        args
    }

    fn helm_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(path) = &self.kubeconfig {
            args.push(format!("--kubeconfig={}", path.display()));
        }
        if let Some(context) = &self.context {
            args.push(format!("--kube-context={context}"));
        }
        args
    }
}

/// Run a program to completion and return its standard output
pub async fn run(program: &str, args: &[String]) -> Result<String, BackendError> {
    debug!("Running {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|source| BackendError::Io {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(BackendError::Command {
            program: program.to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Arguments of `kubectl exec <pod> -n <namespace> -- <command>`
pub fn kubectl_exec_args(
    kube: &KubeContext,
    pod: &str,
    namespace: &str,
    command: &[String],
) -> Vec<String> {
    let mut args = kube.kubectl_args();
    args.extend(["exec".to_string(), pod.to_string(), "-n".to_string(), namespace.to_string()]);
    args.push("--".to_string());
    args.extend(command.iter().cloned());
    args
}

/// Arguments installing the ingress controller release
pub fn helm_install_args(
    kube: &KubeContext,
    ingress: &IngressControllerConfig,
    values: &Path,
) -> Vec<String> {
    let mut args = kube.helm_args();
    args.extend([
        "install".to_string(),
        ingress.release_name.clone(),
        ingress.chart.clone(),
        "--repo".to_string(),
        ingress.repository.clone(),
        "--namespace".to_string(),
        ingress.namespace.clone(),
        "--values".to_string(),
        values.display().to_string(),
    ]);
    args
}

/// Arguments uninstalling the ingress controller release
pub fn helm_uninstall_args(kube: &KubeContext, ingress: &IngressControllerConfig) -> Vec<String> {
    let mut args = kube.helm_args();
    args.extend([
        "uninstall".to_string(),
        ingress.release_name.clone(),
        "--namespace".to_string(),
        ingress.namespace.clone(),
    ]);
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kubectl_exec_args() {
        let kube = KubeContext {
            kubeconfig: None,
            context: Some("minikube".to_string()),
        };
        let args = kubectl_exec_args(&kube, "db-5d8f7", "default", &["psql".to_string(), "-c".to_string(), "select 1".to_string()]);
        assert_eq!(
            args,
            vec!["--context=minikube", "exec", "db-5d8f7", "-n", "default", "--", "psql", "-c", "select 1"]
        );
    }

    #[test]
    fn test_helm_args() {
        let ingress = IngressControllerConfig::default();
        let install = helm_install_args(&KubeContext::default(), &ingress, Path::new("/t/minikube.yaml"));
        assert_eq!(install[0], "install");
        assert_eq!(install[1], "reana-traefik");
        assert!(install.windows(2).any(|w| w[0] == "--namespace" && w[1] == "kube-system"));
        assert!(install.windows(2).any(|w| w[0] == "--values" && w[1] == "/t/minikube.yaml"));

        let uninstall = helm_uninstall_args(&KubeContext::default(), &ingress);
        assert_eq!(uninstall, vec!["uninstall", "reana-traefik", "--namespace", "kube-system"]);
    }

    #[tokio::test]
    async fn test_run_reports_failure() {
        let err = run("sh", &["-c".to_string(), "echo boom >&2; exit 3".to_string()])
            .await
            .unwrap_err();
        match err {
            BackendError::Command { status, stderr, .. } => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_run_missing_program() {
        let err = run("reana-no-such-program", &[]).await.unwrap_err();
        assert!(matches!(err, BackendError::Io { .. }));
    }
}
