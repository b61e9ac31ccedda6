//! End-to-end runs of the `alertlog` binary against a fake Bot API.

use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn alertlog_bin() -> Result<Command> {
    Ok(Command::cargo_bin("alertlog")?)
}

/// Starts a Bot API stand-in answering every `sendMessage` with `status`.
fn fake_bot_api(rt: &Runtime, status: u16) -> MockServer {
    rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bottest-token/sendMessage"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;
        server
    })
}

fn config_for(server: &MockServer) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"
        [logging]
        queue_capacity = 4
        [telegram]
        token = "test-token"
        chat_id = "-100"
        thread_id = "9"
        api_base_url = "{}"
        "#,
        server.uri()
    )?;
    Ok(file)
}

/// Decoded `text` fields of every request the server received.
fn alert_texts(rt: &Runtime, server: &MockServer) -> Vec<String> {
    let requests = rt.block_on(server.received_requests()).unwrap_or_default();
    requests
        .iter()
        .map(|request| {
            form_urlencoded::parse(&request.body)
                .find(|(key, _)| key == "text")
                .map(|(_, value)| value.into_owned())
                .unwrap_or_default()
        })
        .collect()
}

#[test]
fn test_fatal_delivers_its_alert_and_exits_with_status_1() -> Result<()> {
    let rt = Runtime::new()?;
    let server = fake_bot_api(&rt, 200);
    let config = config_for(&server)?;

    let mut cmd = alertlog_bin()?;
    cmd.arg("--config")
        .arg(config.path())
        .arg("--alert")
        .args(["fatal", "db", "gone"]);

    cmd.assert()
        .code(1)
        .stderr(contains("\x1b[35msrc/main.rs:"))
        .stderr(contains(" db gone\n\x1b[0m"));

    let texts = alert_texts(&rt, &server);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("[FATAL] src/main.rs:"), "{}", texts[0]);
    assert!(texts[0].ends_with(" db gone\n"));
    Ok(())
}

#[test]
fn test_panic_delivers_its_alert_and_unwinds() -> Result<()> {
    let rt = Runtime::new()?;
    let server = fake_bot_api(&rt, 200);
    let config = config_for(&server)?;

    let mut cmd = alertlog_bin()?;
    cmd.arg("--config")
        .arg(config.path())
        .arg("--alert")
        .args(["panic", "boom"]);

    cmd.assert().code(101).stderr(contains("boom"));

    let texts = alert_texts(&rt, &server);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].starts_with("[PANIC] "));
    Ok(())
}

#[test]
fn test_unrouted_level_sends_nothing() -> Result<()> {
    let rt = Runtime::new()?;
    let server = fake_bot_api(&rt, 200);
    let config = config_for(&server)?;

    let mut cmd = alertlog_bin()?;
    cmd.arg("--config")
        .arg(config.path())
        .args(["crit", "disk", "full"]);

    cmd.assert()
        .success()
        .stderr(contains("\x1b[31msrc/main.rs:"))
        .stderr(contains(" disk full\n"));

    assert!(alert_texts(&rt, &server).is_empty());
    Ok(())
}

#[test]
fn test_failed_delivery_is_reported_locally() -> Result<()> {
    let rt = Runtime::new()?;
    let server = fake_bot_api(&rt, 500);
    let config = config_for(&server)?;

    let mut cmd = alertlog_bin()?;
    cmd.arg("--config")
        .arg(config.path())
        .arg("--alert")
        .args(["crit", "disk", "full"]);

    cmd.assert()
        .success()
        .stderr(contains("[TG FAIL]"))
        .stderr(contains("code not 200 (500)"));

    // One attempt, no retry.
    assert_eq!(alert_texts(&rt, &server).len(), 1);
    Ok(())
}

#[test]
fn test_formatted_record_without_config() -> Result<()> {
    let mut cmd = alertlog_bin()?;
    cmd.args(["--queue-capacity", "0", "--format", "%s=%s", "info", "key", "5"]);

    cmd.assert().success().stderr(contains("src/main.rs:")).stderr(contains(" key=5"));
    Ok(())
}

#[test]
fn test_unknown_level_is_rejected() -> Result<()> {
    let mut cmd = alertlog_bin()?;
    cmd.args(["debug", "x"]);
    cmd.assert().failure().stderr(contains("unknown log level"));
    Ok(())
}
