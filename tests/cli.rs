use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn helm_viv() -> Command {
    let mut cmd = Command::cargo_bin("helm-viv").unwrap();
    cmd.env("HELM_VIV_HELMBIN", "echo").env_remove("HELM_DEBUG");
    cmd
}

#[test]
fn test_version_prints_plugin_version() {
    helm_viv()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "helm-viv {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_template_appends_rendered_value_files() {
    let tmp = TempDir::new().unwrap();
    let chart = tmp.path().join("app");
    fs::create_dir_all(chart.join("vivs")).unwrap();
    fs::write(chart.join("Chart.yaml"), "name: app\nversion: 0.1.0\n").unwrap();
    fs::write(chart.join("values.yaml"), "host: example.com\n").unwrap();
    fs::write(chart.join("vivs/values.yaml"), "url: \"https://{{ Values.host }}\"\n").unwrap();

    helm_viv()
        .args(["template", "rel"])
        .arg(&chart)
        .assert()
        .success()
        .stdout(predicate::str::contains("template rel"))
        .stdout(predicate::str::contains("-f"))
        .stdout(predicate::str::contains("vivs_values.yaml"));

    assert!(!chart.join("vivTemp").exists());
}

#[test]
fn test_render_failure_exits_non_zero() {
    let tmp = TempDir::new().unwrap();
    let chart = tmp.path().join("app");
    fs::create_dir_all(chart.join("vivs")).unwrap();
    fs::write(chart.join("Chart.yaml"), "name: app\nversion: 0.1.0\n").unwrap();
    fs::write(chart.join("vivs/values.yaml"), "url: {{ Values.host \n").unwrap();

    helm_viv()
        .args(["install", "rel"])
        .arg(&chart)
        .assert()
        .failure()
        .stderr(predicate::str::contains("vivfile generate failed"));

    assert!(!chart.join("vivTemp").exists());
}

#[test]
fn test_unknown_commands_are_forwarded() {
    helm_viv()
        .args(["list", "--all-namespaces"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list --all-namespaces"));
}
