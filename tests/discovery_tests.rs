//! Integration tests for descriptor discovery
//!
//! A broken descriptor or an empty directory must never stop the scan.

use gatehouse::models::ServiceType;
use gatehouse::registry::{discover, discover_with_report};
use gatehouse::test_utils::fixtures::{api_manifest, hybrid_manifest, tool_manifest, write_service};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_malformed_descriptor_does_not_abort_discovery() {
    let root = TempDir::new().unwrap();
    write_service(root.path(), "alpha", &api_manifest("alpha", 8001)).unwrap();
    write_service(root.path(), "beta", &tool_manifest("beta", &["search"])).unwrap();
    write_service(root.path(), "gamma", &hybrid_manifest("gamma", 8003, &["lookup"])).unwrap();
    let broken = write_service(root.path(), "broken", "name: broken\ncapabilities: [not: a map\n").unwrap();

    let report = discover_with_report(root.path()).unwrap();

    let names: Vec<_> = report.manifests.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path(), &broken);
}

#[test]
fn test_missing_required_field_is_a_failure() {
    let root = TempDir::new().unwrap();
    write_service(root.path(), "ok", &api_manifest("ok", 8001)).unwrap();
    write_service(root.path(), "nameless", "version: \"1.0\"\ntype: api\n").unwrap();

    let report = discover_with_report(root.path()).unwrap();

    assert_eq!(report.manifests.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].to_string().contains("name"));
}

#[test]
fn test_directory_without_descriptor_is_skipped() {
    let root = TempDir::new().unwrap();
    write_service(root.path(), "real", &api_manifest("real", 8001)).unwrap();
    fs::create_dir_all(root.path().join("docs")).unwrap();
    fs::write(root.path().join("docs").join("README.md"), "not a service").unwrap();

    let report = discover_with_report(root.path()).unwrap();

    assert_eq!(report.manifests.len(), 1);
    assert!(report.failures.is_empty());
    assert_eq!(report.skipped, vec![root.path().join("docs")]);
}

#[test]
fn test_template_and_hidden_directories_are_ignored() {
    let root = TempDir::new().unwrap();
    write_service(root.path(), "_template", &api_manifest("template", 8000)).unwrap();
    write_service(root.path(), "_template_tool", &tool_manifest("tpl", &["x"])).unwrap();
    write_service(root.path(), ".cache", &api_manifest("cache", 8000)).unwrap();
    write_service(root.path(), "search", &tool_manifest("search", &["find"])).unwrap();

    let manifests = discover(root.path()).unwrap();

    assert_eq!(manifests.len(), 1);
    assert_eq!(manifests[0].name, "search");
    assert_eq!(manifests[0].service_type, ServiceType::ToolProvider);
}

#[test]
fn test_plain_files_in_root_are_ignored() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("manifest.yaml"), api_manifest("stray", 8000)).unwrap();

    let report = discover_with_report(root.path()).unwrap();

    assert!(report.manifests.is_empty());
    assert!(report.skipped.is_empty());
}

#[test]
fn test_yml_extension_is_accepted() {
    let root = TempDir::new().unwrap();
    let dir = root.path().join("legacy");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("manifest.yml"), api_manifest("legacy", 8100)).unwrap();

    let manifests = discover(root.path()).unwrap();

    assert_eq!(manifests.len(), 1);
    assert_eq!(manifests[0].source, dir.join("manifest.yml"));
}

#[test]
fn test_missing_root_yields_empty_result() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("does-not-exist");

    let report = discover_with_report(&missing).unwrap();

    assert!(report.manifests.is_empty());
    assert!(report.failures.is_empty());
}
