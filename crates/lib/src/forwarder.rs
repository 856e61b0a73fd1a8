//! Message Forwarder: sends a chat message to the Facta AI backend as a claim
//! and formats the verdict JSON into a reply. Every failure path becomes a
//! user-visible reply; `handle` never returns an error to the caller.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default outbound request timeout (matches the backend's worst-case analysis time).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const CONNECT_FAILED_REPLY: &str = "❌ Could not connect to Facta AI Backend. Is it running?";
const DEFAULT_VERDICT: &str = "Unknown";
const DEFAULT_EXPLANATION: &str = "No explanation provided.";

/// Forwarder construction settings. The timeout is configurable so tests can
/// exercise the timeout path without waiting the production 60 seconds.
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    pub backend_url: String,
    pub timeout: Duration,
}

impl ForwarderConfig {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error("building forwarder http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Reply delivered back to the conversation. Always `type: "message"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReply {
    #[serde(rename = "type")]
    pub typ: String,
    pub content: String,
}

impl OutboundReply {
    fn message(content: impl Into<String>) -> Self {
        Self {
            typ: "message".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BackendRequest<'a> {
    claim: &'a str,
}

/// Backend verdict JSON: `{ "result": { "verdict": { "verdict", "explanation" } } }`.
/// Every level may be absent; accessors substitute the documented defaults.
#[derive(Debug, Default, Deserialize)]
pub struct BackendResponse {
    #[serde(default)]
    result: Option<BackendResult>,
}

#[derive(Debug, Default, Deserialize)]
struct BackendResult {
    #[serde(default)]
    verdict: Option<BackendVerdict>,
}

#[derive(Debug, Default, Deserialize)]
struct BackendVerdict {
    #[serde(default)]
    verdict: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

impl BackendResponse {
    fn verdict(&self) -> &str {
        self.result
            .as_ref()
            .and_then(|r| r.verdict.as_ref())
            .and_then(|v| v.verdict.as_deref())
            .unwrap_or(DEFAULT_VERDICT)
    }

    fn explanation(&self) -> &str {
        self.result
            .as_ref()
            .and_then(|r| r.verdict.as_ref())
            .and_then(|v| v.explanation.as_deref())
            .unwrap_or(DEFAULT_EXPLANATION)
    }
}

fn format_verdict_reply(data: &BackendResponse) -> String {
    format!(
        "🔍 Verdict: {}\n\n{}\n\n_Analysis by Facta AI_",
        data.verdict(),
        data.explanation()
    )
}

/// Forwards claims to the Facta AI backend. Holds no mutable state; concurrent
/// `handle` calls are independent.
#[derive(Clone)]
pub struct Forwarder {
    backend_url: String,
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(config: ForwarderConfig) -> Result<Self, ForwarderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            backend_url: config.backend_url,
            client,
        })
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Forward one message as a claim and format the backend's answer.
    ///
    /// `conversation_id` is accepted for correlation only; it does not affect
    /// the forwarding. Always returns a reply: backend errors, connection
    /// failures, timeouts, and malformed JSON all map to descriptive messages.
    pub async fn handle(&self, message: &str, conversation_id: &str) -> OutboundReply {
        log::info!(
            "forwarding claim to backend: {} (conversation {})",
            self.backend_url,
            conversation_id
        );
        let res = self
            .client
            .post(&self.backend_url)
            .json(&BackendRequest { claim: message })
            .send()
            .await;
        let res = match res {
            Ok(r) => r,
            Err(e) if e.is_connect() => {
                log::warn!("backend unreachable: {}", e);
                return OutboundReply::message(CONNECT_FAILED_REPLY);
            }
            Err(e) => {
                log::warn!("backend request failed: {}", e);
                return OutboundReply::message(format!("❌ An error occurred: {}", e));
            }
        };

        let status = res.status();
        if status != StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            log::warn!("backend answered {}", status);
            return OutboundReply::message(format!(
                "⚠️ Error from Facta AI Backend: {} - {}",
                status.as_u16(),
                body
            ));
        }

        match res.json::<BackendResponse>().await {
            Ok(data) => OutboundReply::message(format_verdict_reply(&data)),
            Err(e) => {
                log::warn!("backend answer was not verdict JSON: {}", e);
                OutboundReply::message(format!("❌ An error occurred: {}", e))
            }
        }
    }
}
