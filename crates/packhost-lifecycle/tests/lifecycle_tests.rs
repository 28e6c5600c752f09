//! End-to-end lifecycle scenarios over a throwaway host root

mod common;

use common::TestHost;
use packhost_core::types::{ExtensionOrigin, ScaffoldRequest};
use packhost_core::Error;
use std::fs;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_install_upgrade_uninstall_roundtrip() {
    let host = TestHost::new();
    host.publish_package(
        "blog-ext",
        "1.0.0",
        &[(".output/public/index.html", "v1")],
    );

    let record = host.orchestrator.install("blog-ext", None).await.unwrap();
    assert_eq!(record.version, "1.0.0");
    assert_eq!(record.origin, ExtensionOrigin::Market);
    assert_eq!(record.author.as_deref(), Some("mock"));

    let live_dir = host.paths.extension_dir("blog-ext");
    assert!(live_dir.join("build").is_dir());
    assert!(host.paths.install_marker("blog-ext").is_file());
    assert_eq!(
        fs::read_to_string(host.paths.public_dir("blog-ext").join("index.html")).unwrap(),
        "v1"
    );
    assert!(host.enabled.find_entry("blog-ext").await.unwrap().is_some());

    // User data written while the extension runs
    fs::write(host.paths.extension_data_dir("blog-ext").join("user.txt"), "notes").unwrap();

    host.publish_package(
        "blog-ext",
        "1.1.0",
        &[(".output/public/index.html", "v2")],
    );

    let upgraded = host.orchestrator.upgrade("blog-ext").await.unwrap();
    assert_eq!(upgraded.version, "1.1.0");
    assert_eq!(
        fs::read_to_string(
            host.paths.extension_data_dir("blog-ext").join("user.txt")
        )
        .unwrap(),
        "notes"
    );
    assert_eq!(
        fs::read_to_string(host.paths.public_dir("blog-ext").join("index.html")).unwrap(),
        "v2"
    );

    host.orchestrator.uninstall("blog-ext").await.unwrap();
    assert!(!live_dir.exists());
    assert!(!host.paths.public_dir("blog-ext").exists());
    assert!(host.orchestrator.list().await.unwrap().is_empty());
    assert!(host.enabled.find_entry("blog-ext").await.unwrap().is_none());
    assert_eq!(host.registry.uninstall_notices.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_install_without_published_versions() {
    let host = TestHost::new();

    let result = host.orchestrator.install("ghost-ext", None).await;
    assert!(matches!(result, Err(Error::NoVersions { .. })));
}

#[tokio::test]
async fn test_install_twice_is_rejected() {
    let host = TestHost::new();
    host.publish_package("blog-ext", "1.0.0", &[]);

    host.orchestrator.install("blog-ext", None).await.unwrap();
    let second = host.orchestrator.install("blog-ext", None).await;
    assert!(matches!(second, Err(Error::AlreadyExists { .. })));

    // The rejected attempt left no staging residue behind
    let stage_dirs: Vec<_> = fs::read_dir(host.paths.temp_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();
    assert!(stage_dirs.is_empty());
}

#[tokio::test]
async fn test_invalid_package_never_becomes_installed() {
    let host = TestHost::new();

    // Archive without the required marker directories
    let archive = host.temp.path().join("broken.tar.gz");
    let staging = tempfile::TempDir::new().unwrap();
    fs::write(staging.path().join("readme.md"), "not a package").unwrap();
    common::build_archive(staging.path(), &archive);
    host.registry.publish("broken-ext", "1.0.0", archive);

    let result = host.orchestrator.install("broken-ext", None).await;
    assert!(matches!(result, Err(Error::InvalidPackageStructure { .. })));

    assert!(!host.paths.extension_dir("broken-ext").exists());
    assert!(host.orchestrator.list().await.unwrap().is_empty());
    assert!(host.enabled.find_entry("broken-ext").await.unwrap().is_none());
}

#[tokio::test]
async fn test_cache_hit_skips_second_download() {
    let host = TestHost::new();
    host.publish_package("blog-ext", "1.0.0", &[]);

    host.orchestrator.install("blog-ext", None).await.unwrap();
    host.orchestrator.uninstall("blog-ext").await.unwrap();
    host.orchestrator.install("blog-ext", None).await.unwrap();

    assert_eq!(host.registry.download_count(), 1);
}

#[tokio::test]
async fn test_upgrade_lets_new_package_replace_preserved_dirs() {
    let host = TestHost::new();
    host.publish_package("blog-ext", "1.0.0", &[]);
    host.orchestrator.install("blog-ext", None).await.unwrap();

    fs::write(
        host.paths.extension_data_dir("blog-ext").join("user.txt"),
        "notes",
    )
    .unwrap();

    // The new package ships its own data directory, which wins over the
    // preserved copy.
    host.publish_package("blog-ext", "2.0.0", &[("data/seed.txt", "fresh")]);
    host.orchestrator.upgrade("blog-ext").await.unwrap();

    let data_dir = host.paths.extension_data_dir("blog-ext");
    assert!(data_dir.join("seed.txt").is_file());
    assert!(!data_dir.join("user.txt").exists());
}

#[tokio::test]
async fn test_upgrade_missing_extension() {
    let host = TestHost::new();

    let result = host.orchestrator.upgrade("ghost-ext").await;
    assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn test_uninstall_is_rerunnable_after_partial_cleanup() {
    let host = TestHost::new();
    host.publish_package(
        "blog-ext",
        "1.0.0",
        &[(".output/public/index.html", "v1")],
    );
    host.orchestrator.install("blog-ext", None).await.unwrap();

    // A prior uninstall that died after physical cleanup: live directory,
    // published assets, and config entry already gone, record still there.
    fs::remove_dir_all(host.paths.extension_dir("blog-ext")).unwrap();
    fs::remove_dir_all(host.paths.public_dir("blog-ext")).unwrap();
    host.enabled.remove_entry("blog-ext").await.unwrap();

    host.orchestrator.uninstall("blog-ext").await.unwrap();
    assert!(host.orchestrator.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_uninstall_missing_extension() {
    let host = TestHost::new();

    let result = host.orchestrator.uninstall("ghost-ext").await;
    assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn test_install_with_explicit_version() {
    let host = TestHost::new();
    host.publish_package("blog-ext", "1.0.0", &[]);
    host.publish_package("blog-ext", "1.1.0", &[]);

    let record = host
        .orchestrator
        .install("blog-ext", Some("1.0.0"))
        .await
        .unwrap();
    assert_eq!(record.version, "1.0.0");
}

#[tokio::test]
async fn test_install_rejects_malformed_version() {
    let host = TestHost::new();
    host.publish_package("blog-ext", "1.0.0", &[]);

    let result = host.orchestrator.install("blog-ext", Some("latest")).await;
    assert!(matches!(result, Err(Error::InvalidVersion { .. })));
}

#[tokio::test]
async fn test_scaffold_creates_local_extension() {
    let host = TestHost::new();

    let request = ScaffoldRequest {
        identifier: "notes-ext".to_string(),
        name: "Notes".to_string(),
        version: "0.1.0".to_string(),
        description: Some("A notes extension".to_string()),
        author: Some("someone".to_string()),
    };

    let record = host.orchestrator.scaffold(&request).await.unwrap();
    assert_eq!(record.origin, ExtensionOrigin::Local);
    assert_eq!(record.version, "0.1.0");

    let live_dir = host.paths.extension_dir("notes-ext");
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(live_dir.join("manifest.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["name"], "Notes");
    assert_eq!(manifest["version"], "0.1.0");
    // Template fields the patch does not touch survive
    assert_eq!(manifest["entry"], "build/server.mjs");

    let entry = host.enabled.find_entry("notes-ext").await.unwrap().unwrap();
    assert!(entry.is_local);
}

#[tokio::test]
async fn test_scaffold_existing_identifier_is_rejected() {
    let host = TestHost::new();

    let request = ScaffoldRequest {
        identifier: "notes-ext".to_string(),
        name: "Notes".to_string(),
        version: "0.1.0".to_string(),
        description: None,
        author: None,
    };

    host.orchestrator.scaffold(&request).await.unwrap();
    let second = host.orchestrator.scaffold(&request).await;
    assert!(matches!(second, Err(Error::AlreadyExists { .. })));
}

#[tokio::test]
async fn test_operations_arm_a_reload() {
    let host = TestHost::new();
    host.publish_package("blog-ext", "1.0.0", &[]);

    host.orchestrator.install("blog-ext", None).await.unwrap();
    assert!(host.reload.is_pending().await);

    host.reload.flush().await;
    assert_eq!(host.process.reload_count(), 1);
}
