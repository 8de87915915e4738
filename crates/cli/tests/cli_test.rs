//! End-to-end tests for the `declarative` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const APP_BUILD: &str = r#"
plugins = ["com.android.application"]

[android]
namespace = "com.example.app"
compileSdk = 34

[android.defaultConfig]
applicationId = "com.example.app"
minSdk = 24

[android.buildTypes.release]
isMinifyEnabled = true

[androidComponents.onVariants.all]
pseudoLocalesEnabled = true
"#;

fn declarative() -> Command {
    let mut cmd = Command::cargo_bin("declarative").unwrap();
    cmd.env_remove("DECLARATIVE_STRICT").env_remove("RUST_LOG");
    cmd
}

fn write_project(dir: &Path, build: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("build.gradle.toml"), build).unwrap();
}

#[test]
fn test_apply_prints_configured_project() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path(), APP_BUILD);

    let output = declarative().arg("apply").arg(temp.path()).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["plugins"], serde_json::json!(["com.android.application"]));
    assert_eq!(report["android"]["compileSdk"], 34);
    assert_eq!(report["android"]["defaultConfig"]["minSdk"], 24);
    assert_eq!(report["android"]["buildTypes"]["release"]["minifyEnabled"], true);
    assert_eq!(report["variants"][0]["name"], "debug");
    assert_eq!(report["variants"][1]["pseudoLocalesEnabled"], true);
}

#[test]
fn test_apply_without_variants() {
    let temp = TempDir::new().unwrap();
    write_project(temp.path(), APP_BUILD);

    let output = declarative()
        .args(["apply", "--no-variants"])
        .arg(temp.path().join("build.gradle.toml"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report.get("variants").is_none());
}

#[test]
fn test_apply_reports_unknown_key() {
    let temp = TempDir::new().unwrap();
    write_project(
        temp.path(),
        "plugins = [\"com.android.application\"]\n[android]\ncompileSdkVersion = 34\n",
    );

    declarative()
        .arg("apply")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot find `compileSdkVersion` in ApplicationExtension at `android.compileSdkVersion`"));
}

#[test]
fn test_strict_flag_and_config_file() {
    let temp = TempDir::new().unwrap();
    let build = r#"
plugins = ["com.android.application"]

[android.buildTypes.release._dispatch_]
target = "proguardFiles"
method = "missingMethod"
params = ["rules.pro"]
"#;
    write_project(temp.path(), build);

    declarative().arg("apply").arg(temp.path()).assert().success();
    declarative()
        .args(["apply", "--strict"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missingMethod"));

    fs::write(temp.path().join(".declarative.json"), r#"{ "strict": true }"#).unwrap();
    declarative().arg("apply").arg(temp.path()).assert().failure();
    declarative()
        .arg("apply")
        .arg(temp.path())
        .env("DECLARATIVE_STRICT", "0")
        .assert()
        .success();
}

#[test]
fn test_check_reports_each_build_file() {
    let temp = TempDir::new().unwrap();
    write_project(&temp.path().join("app"), APP_BUILD);
    write_project(
        &temp.path().join("broken"),
        "[android]\nnamespace = \"x\"\n",
    );

    declarative()
        .arg("check")
        .arg(temp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("2 checked, 1 failed"))
        .stdout(predicate::str::contains("Cannot find extension `android`"));

    fs::remove_dir_all(temp.path().join("broken")).unwrap();
    declarative()
        .arg("check")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 checked, 0 failed"));
}

#[test]
fn test_shape_of_known_and_unknown_types() {
    declarative()
        .args(["shape", "BuildType"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("type = BuildType"))
        .stdout(predicate::str::contains("initWith"));

    declarative()
        .args(["shape", "Gradle"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown type `Gradle`"));
}
