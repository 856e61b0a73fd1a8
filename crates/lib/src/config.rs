//! Configuration types and loading.
//!
//! Config is sourced from the environment (`FACTA_BACKEND_URL`, `PORT`, ...)
//! once at startup and passed down explicitly; nothing reads the environment
//! after `Config::from_env` returns.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Default agent port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 7000;

/// Default agent id when `AGENT_ID` is unset.
pub const DEFAULT_AGENT_ID: &str = "facta-ai-agent";

/// Default registry host when `REGISTRY_URL` is unset.
pub const DEFAULT_REGISTRY_URL: &str = "https://mumbaihacksindex.chat39.com";

/// Top-level bridge config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Fact-checking backend endpoint (`FACTA_BACKEND_URL`). Required.
    pub backend_url: String,

    /// Port the agent endpoint listens on (`PORT`, default 7000).
    #[serde(default = "default_port")]
    pub port: u16,

    /// When true, a tunnel is expected to expose the local port publicly
    /// (`ENABLE_TUNNEL`, default false). Provisioning happens outside this process.
    #[serde(default)]
    pub enable_tunnel: bool,

    /// Externally visible address override (`PUBLIC_URL`).
    #[serde(default)]
    pub public_url: Option<String>,

    /// Agent id announced to the registry (`AGENT_ID`).
    #[serde(default = "default_agent_id")]
    pub agent_id: String,

    /// Registry endpoint for agent registration (`REGISTRY_URL`).
    #[serde(default = "default_registry_url")]
    pub registry_url: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_agent_id() -> String {
    DEFAULT_AGENT_ID.to_string()
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

impl Config {
    /// Load config from the process environment. `FACTA_BACKEND_URL` must be
    /// set and non-empty; everything else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        let backend_url = non_empty(std::env::var("FACTA_BACKEND_URL").ok());
        let Some(backend_url) = backend_url else {
            bail!("FACTA_BACKEND_URL is not set (backend endpoint is required)");
        };
        let port = parse_port(std::env::var("PORT").ok())
            .context("parsing PORT from environment")?;
        Ok(Self {
            backend_url,
            port,
            enable_tunnel: parse_bool(std::env::var("ENABLE_TUNNEL").ok()),
            public_url: non_empty(std::env::var("PUBLIC_URL").ok()),
            agent_id: non_empty(std::env::var("AGENT_ID").ok())
                .unwrap_or_else(default_agent_id),
            registry_url: non_empty(std::env::var("REGISTRY_URL").ok())
                .unwrap_or_else(default_registry_url),
        })
    }

    /// The address other agents reach this bridge at: `PUBLIC_URL` when set,
    /// otherwise `http://localhost:{port}`.
    pub fn resolve_public_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }
}

/// Trim and drop empty env values so `FOO=""` behaves like unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse `PORT`: unset or empty means the default; anything non-numeric is an error.
fn parse_port(value: Option<String>) -> Result<u16> {
    match non_empty(value) {
        Some(s) => s
            .parse::<u16>()
            .with_context(|| format!("invalid port: {}", s)),
        None => Ok(DEFAULT_PORT),
    }
}

/// Parse `ENABLE_TUNNEL`: only the literal "true" (case-insensitive) enables it.
fn parse_bool(value: Option<String>) -> bool {
    non_empty(value)
        .map(|s| s.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
