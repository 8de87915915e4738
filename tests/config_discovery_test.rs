//! Integration test for `.declarative.json` discovery

use declarative_core::config::CONFIG_FILE_NAME;
use declarative_core::{DeclarativeConfig, Strictness};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_found_in_ancestor_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let module_dir = root.join("modules").join("app");
    fs::create_dir_all(&module_dir).unwrap();

    let config = serde_json::json!({
        "buildFileName": "declarative.toml",
        "projectRoot": "modules"
    });
    fs::write(
        root.join(CONFIG_FILE_NAME),
        serde_json::to_string_pretty(&config).unwrap(),
    )
    .unwrap();

    let discovered = DeclarativeConfig::discover(&module_dir).unwrap();
    assert_eq!(discovered.build_file_name(), "declarative.toml");

    let options = discovered.to_options(&module_dir);
    assert_eq!(options.project_root(), root.join("modules"));
}

#[test]
fn test_nearest_config_wins() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let module_dir = root.join("app");
    fs::create_dir_all(&module_dir).unwrap();

    fs::write(root.join(CONFIG_FILE_NAME), r#"{ "buildFileName": "outer.toml" }"#).unwrap();
    fs::write(module_dir.join(CONFIG_FILE_NAME), r#"{ "buildFileName": "inner.toml" }"#).unwrap();

    let discovered = DeclarativeConfig::discover(&module_dir.join("inner.toml")).unwrap();
    assert_eq!(discovered.build_file_name(), "inner.toml");
}

#[test]
fn test_defaults_without_config() {
    let temp_dir = TempDir::new().unwrap();
    let discovered = DeclarativeConfig::discover(temp_dir.path()).unwrap();
    let options = discovered.to_options(temp_dir.path());
    assert_eq!(options.project_root(), temp_dir.path());
    if std::env::var("DECLARATIVE_STRICT").is_err() {
        assert_eq!(options.strictness, Strictness::Lenient);
    }
}
