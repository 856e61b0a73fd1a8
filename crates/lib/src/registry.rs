//! Registry client: announces the agent card (id + public URL) to the agent
//! registry at startup so other agents can discover this bridge.

use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentCard<'a> {
    agent_id: &'a str,
    public_url: &'a str,
}

/// Client for the agent registry HTTP API.
#[derive(Clone)]
pub struct RegistryClient {
    registry_url: String,
    client: reqwest::Client,
}

impl RegistryClient {
    pub fn new(registry_url: impl Into<String>) -> Self {
        Self {
            registry_url: registry_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// POST /agents — register the agent card. Non-2xx answers are errors; the
    /// caller decides whether registration failure is fatal (it is not at startup).
    pub async fn register(&self, agent_id: &str, public_url: &str) -> Result<(), String> {
        let url = format!("{}/agents", self.registry_url);
        let card = AgentCard {
            agent_id,
            public_url,
        };
        let res = self
            .client
            .post(&url)
            .json(&card)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("registration failed: {} {}", status, body));
        }
        Ok(())
    }
}
