//! Integration tests for remote config and offline fallbacks

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn qmd_remote_cmd(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("qmd-remote").unwrap();
    cmd.env("QMD_CONFIG_DIR", config_dir.path())
        .env_remove("QMD_EMBED_URL")
        .env_remove("QMD_RERANK_URL")
        .env_remove("QMD_GENERATE_URL")
        .env_remove("QMD_GENERATE_MODEL");
    cmd
}

#[test]
fn test_remote_set_and_show() {
    let config_dir = TempDir::new().unwrap();

    qmd_remote_cmd(&config_dir)
        .args(["remote", "set", "--embed-url", "http://embed:8080/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved remote config"));

    qmd_remote_cmd(&config_dir)
        .args(["remote", "set", "--rerank-url", "http://rerank:8081"])
        .assert()
        .success();

    qmd_remote_cmd(&config_dir)
        .args(["--format", "json", "remote", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"embedUrl\": \"http://embed:8080\""))
        .stdout(predicate::str::contains("\"rerankUrl\": \"http://rerank:8081\""))
        .stdout(predicate::str::contains("generateUrl").not());
}

#[test]
fn test_remote_set_rejects_non_http_url() {
    let config_dir = TempDir::new().unwrap();

    qmd_remote_cmd(&config_dir)
        .args(["remote", "set", "--embed-url", "ftp://embed:8080"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("must start with http://"));

    assert!(!config_dir.path().join("config.json").exists());
}

#[test]
fn test_remote_clear_keeps_dir() {
    let config_dir = TempDir::new().unwrap();

    qmd_remote_cmd(&config_dir)
        .args(["dir", "set", "/srv/notes"])
        .assert()
        .success();
    qmd_remote_cmd(&config_dir)
        .args(["remote", "set", "--generate-url", "http://gen"])
        .assert()
        .success();
    qmd_remote_cmd(&config_dir)
        .args(["remote", "clear"])
        .assert()
        .success();

    qmd_remote_cmd(&config_dir)
        .args(["remote", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No remote endpoints configured"));

    qmd_remote_cmd(&config_dir)
        .args(["dir", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/srv/notes"));
}

#[test]
fn test_corrupt_config_is_ignored() {
    let config_dir = TempDir::new().unwrap();
    fs::write(config_dir.path().join("config.json"), "{{{ nope").unwrap();

    qmd_remote_cmd(&config_dir)
        .args(["remote", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No remote endpoints configured"));

    qmd_remote_cmd(&config_dir)
        .args(["dir", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No qmd directory saved"));
}

#[test]
fn test_health_without_endpoints() {
    let config_dir = TempDir::new().unwrap();

    qmd_remote_cmd(&config_dir)
        .args(["--format", "json", "health"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"embed\": false"))
        .stdout(predicate::str::contains("\"rerank\": false"))
        .stdout(predicate::str::contains("\"generate\": false"));
}

#[test]
fn test_expand_without_generate_endpoint() {
    let config_dir = TempDir::new().unwrap();

    qmd_remote_cmd(&config_dir)
        .args(["expand", "rust", "traits"])
        .assert()
        .success()
        .stdout(predicate::eq("lex: rust traits\nvec: rust traits\n"));

    qmd_remote_cmd(&config_dir)
        .args(["expand", "--no-lex", "rust"])
        .assert()
        .success()
        .stdout(predicate::eq("vec: rust\n"));
}

#[test]
fn test_rerank_without_endpoint_keeps_order() {
    let config_dir = TempDir::new().unwrap();

    qmd_remote_cmd(&config_dir)
        .args(["rerank", "query", "--doc", "first", "--doc", "second"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.000  #0  first"))
        .stdout(predicate::str::contains("0.900  #1  second"))
        .stderr(predicate::str::contains("Reranking unavailable"));
}

#[test]
fn test_embed_without_endpoint() {
    let config_dir = TempDir::new().unwrap();

    qmd_remote_cmd(&config_dir)
        .args(["embed", "hello"])
        .assert()
        .success()
        .stdout(predicate::str::contains("unavailable  hello"));
}
