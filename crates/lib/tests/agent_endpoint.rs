//! Integration test: start the agent endpoint on a free port, check health and
//! the message round-trip through a stub backend. Does not require a real
//! Facta backend. The server tasks are left running when the tests end.

use axum::routing::post;
use axum::{Json, Router};
use lib::agent;
use lib::config::Config;
use lib::forwarder::{Forwarder, ForwarderConfig};
use std::time::Duration;

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

fn test_config(backend_url: &str, port: u16) -> Config {
    Config {
        backend_url: backend_url.to_string(),
        port,
        enable_tunnel: false,
        public_url: None,
        agent_id: "facta-ai-agent".to_string(),
        registry_url: "http://127.0.0.1:1/unused".to_string(),
    }
}

/// Stub backend that always answers 200 with a fixed verdict.
async fn spawn_verdict_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("local_addr");
    let app = Router::new().route(
        "/check",
        post(|| async {
            Json(serde_json::json!({
                "result": { "verdict": { "verdict": "True", "explanation": "Confirmed." } }
            }))
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}/check", addr)
}

/// Start the agent endpoint and wait until its health route answers.
async fn start_agent(config: Config) -> String {
    let port = config.port;
    let forwarder = Forwarder::new(ForwarderConfig {
        backend_url: config.backend_url.clone(),
        timeout: Duration::from_secs(2),
    })
    .expect("build forwarder");
    tokio::spawn(async move {
        let _ = agent::run_agent_with(config, forwarder).await;
    });

    let base = format!("http://127.0.0.1:{}", port);
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(resp) = client.get(&base).send().await {
            if resp.status().is_success() {
                return base;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("agent endpoint on {} did not come up within 5s", base);
}

#[tokio::test]
async fn health_reports_running_agent() {
    let backend = spawn_verdict_backend().await;
    let port = free_port();
    let base = start_agent(test_config(&backend, port)).await;

    let json: serde_json::Value = reqwest::get(&base)
        .await
        .expect("GET /")
        .json()
        .await
        .expect("parse JSON");
    assert_eq!(json.get("runtime").and_then(|v| v.as_str()), Some("running"));
    assert_eq!(
        json.get("agentId").and_then(|v| v.as_str()),
        Some("facta-ai-agent")
    );
    assert_eq!(json.get("port").and_then(|v| v.as_u64()), Some(port as u64));
}

#[tokio::test]
async fn message_round_trip_returns_verdict_reply() {
    let backend = spawn_verdict_backend().await;
    let base = start_agent(test_config(&backend, free_port())).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/message", base))
        .json(&serde_json::json!({ "message": "the sky is blue", "conversationId": "c1" }))
        .send()
        .await
        .expect("POST /api/message");
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.expect("parse JSON");
    assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("message"));
    assert_eq!(
        json.get("content").and_then(|v| v.as_str()),
        Some("🔍 Verdict: True\n\nConfirmed.\n\n_Analysis by Facta AI_")
    );
}

#[tokio::test]
async fn backend_failure_still_answers_with_reply() {
    // Backend URL points at a closed port: the reply carries the failure text.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    drop(listener);
    let base = start_agent(test_config(&format!("http://{}/check", addr), free_port())).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/message", base))
        .json(&serde_json::json!({ "message": "claim" }))
        .send()
        .await
        .expect("POST /api/message");
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.expect("parse JSON");
    assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("message"));
    assert_eq!(
        json.get("content").and_then(|v| v.as_str()),
        Some("❌ Could not connect to Facta AI Backend. Is it running?")
    );
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let backend = spawn_verdict_backend().await;
    let base = start_agent(test_config(&backend, free_port())).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/message", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("POST /api/message");
    assert_eq!(resp.status(), 400);
}
