//! Integration tests for `startup-code check --json` output.

use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-p", "startup-cli", "--bin", "startup-code", "--"]);
    cmd
}

fn check(dir: &Path, command: &str) -> (bool, serde_json::Value) {
    let output = cargo_bin()
        .args(["check", "--json", "--command", command, "--cwd"])
        .arg(dir)
        .output()
        .expect("Failed to run check command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    (output.status.success(), json)
}

#[test]
fn test_check_dev_registers_plugin_and_route() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("startup.config.mjs"),
        r#"
            export default {
                adapter: '@astrojs/node',
                startup: { entrypoint: './src/cron/example.ts' },
            };
        "#,
    )
    .unwrap();

    let (success, json) = check(dir.path(), "dev");
    assert!(success);
    assert_eq!(json["ok"], true);
    assert_eq!(json["command"], "dev");
    assert_eq!(json["load_in_dev"], true);
    assert_eq!(json["plugins"], serde_json::json!(["startup-code"]));

    let entrypoint = json["entrypoint"].as_str().unwrap();
    assert!(entrypoint.ends_with("/src/cron/example.ts"));

    let routes = json["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["pattern"], "/dev-only/startup-code");
    assert_eq!(routes[0]["entrypoint"], entrypoint);
    assert_eq!(routes[0]["prerender"], true);
}

#[test]
fn test_check_build_has_no_route() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("startup.config.json"),
        r#"{"adapter":"@deno/astro-adapter","startup":{"entrypoint":"boot.ts"}}"#,
    )
    .unwrap();

    let (success, json) = check(dir.path(), "build");
    assert!(success);
    assert_eq!(json["load_in_dev"], false);
    assert!(json["routes"].as_array().unwrap().is_empty());
}

#[test]
fn test_check_rejects_unsupported_adapter() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("startup.config.json"),
        r#"{"adapter":"@astrojs/vercel","startup":{"entrypoint":"boot.ts"}}"#,
    )
    .unwrap();

    let (success, json) = check(dir.path(), "dev");
    assert!(!success);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], "E_ADAPTER");
    assert_eq!(
        json["error"]["message"],
        "startup-code currently only works with one of the following adapters: \
         @astrojs/node, @deno/astro-adapter"
    );
}

#[test]
fn test_check_without_config() {
    let dir = tempdir().unwrap();

    let (success, json) = check(dir.path(), "build");
    assert!(!success);
    assert_eq!(json["error"]["code"], "E_CONFIG");
}
