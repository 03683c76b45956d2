//! End-to-end runs of the bundled specification against the mock backend

use reana_backend::{BackendConfig, ClusterBackend, ManifestKind, MockClusterBackend, Outcome};
use reana_cluster::config::DEFAULT_SPEC_FILE;
use reana_cluster::inspector;
use reana_cluster::output::{read_manifest, write_manifests};
use reana_cluster::reconciler::{self, DownOptions, InitOptions};
use reana_cluster::secrets::FixedSecretValues;
use reana_cluster::{GeneratorOptions, Session};
use std::path::Path;

fn session(options: GeneratorOptions) -> Session {
    Session::load(Path::new(DEFAULT_SPEC_FILE), false, &options, BackendConfig::default())
        .expect("bundled specification loads")
}

#[tokio::test]
async fn test_init_twice_only_sees_existing_objects() {
    let session = session(GeneratorOptions::default());
    let mock = MockClusterBackend::default();
    mock.set_service_account_token("reana-system-token-x7k2p");

    let first = reconciler::init(&session.manifests, &mock, &mut FixedSecretValues::new(), InitOptions::default())
        .await
        .expect("first init");
    assert_eq!(first.created, session.manifests.len());

    let second = reconciler::init(&session.manifests, &mock, &mut FixedSecretValues::new(), InitOptions::default())
        .await
        .expect("second init");
    assert_eq!(second.created, 0);
    assert_eq!(second.already_existed, session.manifests.len());

    let job_controller = mock
        .object(ManifestKind::Deployment, "job-controller", "default")
        .expect("job controller deployed");
    let volumes = job_controller.as_value().pointer("/spec/template/spec/volumes").expect("volumes");
    assert!(volumes.as_array().expect("array").iter().any(|v| v["secret"]["secretName"] == "reana-system-token-x7k2p"));
}

#[tokio::test]
async fn test_down_twice_never_fails() {
    let session = session(GeneratorOptions {
        cvmfs: true,
        ..GeneratorOptions::default()
    });
    let mock = MockClusterBackend::default();
    reconciler::init(&session.manifests, &mock, &mut FixedSecretValues::new(), InitOptions::default())
        .await
        .expect("init");

    let first = reconciler::down(&session.manifests, &mock, DownOptions::default()).await;
    assert_eq!(first.deleted, session.manifests.len());
    assert_eq!(mock.object_count(), 0);

    let second = reconciler::down(&session.manifests, &mock, DownOptions::default()).await;
    assert_eq!(second.deleted, 0);
    assert_eq!(second.failed, 0);
    assert_eq!(second.already_gone, session.manifests.len());
}

#[tokio::test]
async fn test_deployed_images_match_the_specification() {
    let session = session(GeneratorOptions::default());
    let mock = MockClusterBackend::default();
    reconciler::init(&session.manifests, &mock, &mut FixedSecretValues::new(), InitOptions::default())
        .await
        .expect("init");

    let results = inspector::verify_components(&session.manifests, &mock).await.expect("verify");
    assert!(results.values().all(|matches| *matches));

    mock.set_deployed_image("server", "default", "reanahub/reana-server:0.4.0");
    let results = inspector::verify_components(&session.manifests, &mock).await.expect("verify");
    assert!(!results["server"]);
    assert!(results["db"]);
}

#[test]
fn test_written_manifests_read_back_unchanged() {
    let session = session(GeneratorOptions {
        cephfs: true,
        ui: true,
        ..GeneratorOptions::default()
    });
    let dir = tempfile::tempdir().expect("tempdir");

    let written = write_manifests(&session.manifests, dir.path()).expect("write");
    assert_eq!(written.len(), session.manifests.len());
    assert!(dir.path().join("deployments/server-manifest.yaml").exists());
    assert!(dir.path().join("persistentvolumeclaims/reana-shared-persistent-volume-manifest.yaml").exists());

    for (path, original) in written.iter().zip(&session.manifests) {
        assert_eq!(&read_manifest(path).expect("read"), original);
    }
}

#[tokio::test]
async fn test_failed_create_is_reported_with_position() {
    let session = session(GeneratorOptions::default());
    let mock = MockClusterBackend::default();
    mock.fail_with("Deployment", "cache", 403);

    let err = reconciler::init(&session.manifests, &mock, &mut FixedSecretValues::new(), InitOptions::default())
        .await
        .expect_err("init must stop");
    let message = err.to_string();
    assert!(message.contains("Deployment cache"), "{message}");

    let index = session
        .manifests
        .iter()
        .position(|m| m.kind() == Some(ManifestKind::Deployment) && m.name() == "cache")
        .expect("cache deployment");
    assert!(message.contains(&format!("manifest #{index}")), "{message}");
    assert_eq!(
        mock.create(session.manifests.find(ManifestKind::Deployment, "db").expect("db")).await.expect("create"),
        Outcome::AlreadyExists
    );
}
