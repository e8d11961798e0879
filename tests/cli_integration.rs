//! Integration tests for the Lockit CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Interactive prompts cannot be automated, so message passwords go
//! through `LOCKIT_PASSWORD` and message bodies through piped stdin.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use assert_cmd::Command;
use lockit::crypto::verifier::MIN_MEMORY_KIB;
use lockit::crypto::Argon2Params;
use lockit::server::{Server, ServerConfig};
use lockit::service::{Limits, MessageService};
use lockit::vault::VaultStore;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper: get a Command pointing at the lockit binary, isolated from the
/// caller's environment.
fn lockit(config_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("lockit").expect("binary should exist");
    cmd.env_remove("LOCKIT_PASSWORD")
        .env_remove("LOCKIT_SERVER")
        .env_remove("RUST_LOG")
        .env("LOCKIT_CONFIG", missing_config(config_dir));
    cmd
}

fn missing_config(dir: &TempDir) -> PathBuf {
    dir.path().join("lockit.toml")
}

/// A server on a loopback port, alive for as long as the runtime is.
struct BackgroundServer {
    addr: SocketAddr,
    _runtime: tokio::runtime::Runtime,
}

impl BackgroundServer {
    fn start() -> Self {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let store = VaultStore::new(Argon2Params {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        })
        .expect("store");
        let service = MessageService::new(Arc::new(store), Limits::default());
        let config = ServerConfig {
            bind_address: "127.0.0.1:0".into(),
            max_connections: 16,
            sweep_interval: None,
        };

        let server = runtime
            .block_on(Server::bind(config, service))
            .expect("bind");
        let addr = server.local_addr().expect("local addr");
        runtime.spawn(server.run_until(std::future::pending::<()>()));

        Self {
            addr,
            _runtime: runtime,
        }
    }

    fn address(&self) -> String {
        self.addr.to_string()
    }
}

fn link_from(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout).trim().to_string()
}

// ---------------------------------------------------------------------------
// Static behaviour
// ---------------------------------------------------------------------------

#[test]
fn help_flag_shows_usage() {
    let tmp = TempDir::new().unwrap();
    lockit(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ephemeral encrypted message vault"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("send"))
        .stdout(predicate::str::contains("open"))
        .stdout(predicate::str::contains("peek"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn version_flag_shows_version() {
    let tmp = TempDir::new().unwrap();
    lockit(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lockit"));
}

#[test]
fn no_args_shows_help() {
    let tmp = TempDir::new().unwrap();
    lockit(&tmp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn config_without_file_shows_defaults() {
    let tmp = TempDir::new().unwrap();
    lockit(&tmp)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:7878"))
        .stdout(predicate::str::contains("604800"));
}

#[test]
fn config_reads_file_values() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("custom.toml");
    std::fs::write(
        &path,
        "bind_address = \"0.0.0.0:9000\"\nmax_ttl_seconds = 3600\n",
    )
    .unwrap();

    lockit(&tmp)
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.0.0.0:9000"))
        .stdout(predicate::str::contains("3600"));
}

#[test]
fn config_with_invalid_toml_fails() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.toml");
    std::fs::write(&path, "max_ttl_seconds = \"soon\"").unwrap();

    lockit(&tmp)
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file error"));
}

#[test]
fn send_rejects_invalid_ttl() {
    let tmp = TempDir::new().unwrap();
    lockit(&tmp)
        .args(["send", "--ttl", "5x"])
        .write_stdin("hello")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid ttl"));
}

#[test]
fn send_rejects_empty_message() {
    let tmp = TempDir::new().unwrap();
    lockit(&tmp)
        .arg("send")
        .write_stdin("  \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("message cannot be empty"));
}

#[test]
fn open_rejects_malformed_link() {
    let tmp = TempDir::new().unwrap();
    lockit(&tmp)
        .args(["open", "not-a-reference"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid share link"));
}

#[test]
fn open_reports_unreachable_server() {
    let tmp = TempDir::new().unwrap();
    lockit(&tmp)
        .args(["--server", "127.0.0.1:1", "open", "AAAAAAAAAAAAAAAAAAAAAA"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot reach server"));
}

// ---------------------------------------------------------------------------
// Against a live server
// ---------------------------------------------------------------------------

#[test]
fn send_then_open_burns_the_message() {
    let tmp = TempDir::new().unwrap();
    let server = BackgroundServer::start();

    let sent = lockit(&tmp)
        .args(["--server", &server.address(), "send", "--burn", "--ttl", "10m"])
        .write_stdin("hello from lockit")
        .assert()
        .success()
        .stderr(predicate::str::contains("destroyed after the first read"));
    let link = link_from(&sent.get_output().stdout);
    assert!(link.contains('#'), "encrypted sends carry a key fragment");

    lockit(&tmp)
        .args(["--server", &server.address(), "peek", &link])
        .assert()
        .success()
        .stdout(predicate::str::contains("Message is available"));

    lockit(&tmp)
        .args(["--server", &server.address(), "open", &link])
        .assert()
        .success()
        .stdout("hello from lockit");

    lockit(&tmp)
        .args(["--server", &server.address(), "open", &link])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn password_protected_message_via_env() {
    let tmp = TempDir::new().unwrap();
    let server = BackgroundServer::start();

    let sent = lockit(&tmp)
        .env("LOCKIT_PASSWORD", "correct horse")
        .args(["--server", &server.address(), "send", "--password"])
        .write_stdin("gated text\n")
        .assert()
        .success();
    let link = link_from(&sent.get_output().stdout);

    // Wrong password, no terminal to re-prompt on: fails without consuming.
    lockit(&tmp)
        .env("LOCKIT_PASSWORD", "battery staple")
        .args(["--server", &server.address(), "open", &link])
        .assert()
        .failure();

    lockit(&tmp)
        .env("LOCKIT_PASSWORD", "correct horse")
        .args(["--server", &server.address(), "open", &link])
        .assert()
        .success()
        .stdout("gated text\n");
}

#[test]
fn open_with_output_writes_file() {
    let tmp = TempDir::new().unwrap();
    let server = BackgroundServer::start();
    let out = tmp.path().join("message.bin");

    let sent = lockit(&tmp)
        .args(["--server", &server.address(), "send", "--raw"])
        .write_stdin("raw bytes")
        .assert()
        .success();
    let link = link_from(&sent.get_output().stdout);
    assert!(!link.contains('#'), "raw sends have no key");

    lockit(&tmp)
        .args(["--server", &server.address(), "open", &link, "--output"])
        .arg(&out)
        .assert()
        .success();
    assert_eq!(std::fs::read(&out).unwrap(), b"raw bytes");
}

#[test]
fn open_to_pipe_is_byte_exact() {
    let tmp = TempDir::new().unwrap();
    let server = BackgroundServer::start();
    let payload: Vec<u8> = vec![0x00, 0xFF, b'b', b'i', b'n', 0x7F, 0x01];

    let sent = lockit(&tmp)
        .args(["--server", &server.address(), "send"])
        .write_stdin(payload.clone())
        .assert()
        .success();
    let link = link_from(&sent.get_output().stdout);

    let opened = lockit(&tmp)
        .args(["--server", &server.address(), "open", &link])
        .assert()
        .success();
    assert_eq!(opened.get_output().stdout, payload);
}
