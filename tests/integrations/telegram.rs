use alertlog::config::TelegramConfig;
use alertlog::notification::{AlertSender, ReqwestTransport};
use alertlog::PipelineState;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn telegram_config(server: &MockServer) -> TelegramConfig {
    TelegramConfig {
        token: "123:abc".to_string(),
        chat_id: "-10042".to_string(),
        thread_id: "7".to_string(),
        queue_capacity: 8,
        api_base_url: server.uri(),
    }
}

fn start_sender(server: &MockServer) -> AlertSender {
    let transport = Arc::new(ReqwestTransport::new("alertlog-test"));
    AlertSender::start(&telegram_config(server), transport).unwrap()
}

#[test]
fn test_alert_matches_the_bot_api_contract() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string(
                "chat_id=-10042&message_thread_id=7&text=%5BCRIT%5D+app%2Fdisk.rs%3A12+disk+full%0A",
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let sender = start_sender(&server);
    assert!(sender.enqueue("[CRIT] app/disk.rs:12 disk full\n".to_string()));
    sender.stop();

    assert_eq!(sender.state(), PipelineState::Terminated);
    rt.block_on(server.verify());
}

#[test]
fn test_alerts_are_delivered_in_order() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(5)
            .mount(&server)
            .await;
        server
    });

    let sender = start_sender(&server);
    for n in 0..5 {
        sender.enqueue(format!("[WARN] a.rs:1 alert {n}\n"));
    }
    sender.stop();

    let requests = rt.block_on(server.received_requests()).unwrap();
    let texts: Vec<String> = requests
        .iter()
        .map(|r| String::from_utf8(r.body.clone()).unwrap())
        .collect();
    for (n, body) in texts.iter().enumerate() {
        assert!(body.ends_with(&format!("alert+{n}%0A")), "{body}");
    }
    rt.block_on(server.verify());
}

#[test]
fn test_rejected_alert_is_not_retried() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&server)
            .await;
        server
    });

    let sender = start_sender(&server);
    sender.enqueue("[PANIC] a.rs:1 boom\n".to_string());
    sender.stop();

    rt.block_on(server.verify());
}

#[test]
fn test_stop_waits_for_the_attempt_in_flight() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;
        server
    });

    let sender = start_sender(&server);
    sender.enqueue("[FATAL] a.rs:1 slow\n".to_string());
    sender.stop();

    let requests = rt.block_on(server.received_requests()).unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!sender.enqueue("[FATAL] a.rs:2 too late\n".to_string()));
}

#[test]
fn test_unreachable_api_does_not_block_shutdown() {
    let config = TelegramConfig {
        token: "t".to_string(),
        chat_id: "1".to_string(),
        thread_id: "2".to_string(),
        queue_capacity: 2,
        // Reserved port, nothing listens there.
        api_base_url: "http://127.0.0.1:9".to_string(),
    };
    let sender = AlertSender::start(&config, Arc::new(ReqwestTransport::new("alertlog-test"))).unwrap();

    sender.enqueue("[CRIT] a.rs:1 lost\n".to_string());
    sender.stop();

    assert_eq!(sender.state(), PipelineState::Terminated);
}
