//! Upstream connection configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

/// Connection settings for the upstream curation API and the repository
/// directory used for project-name resolution.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the upstream content API (default: https://api.utopian.io/api).
    pub api_base: String,

    /// Base URL of the upstream web frontend, used for canonical post links
    /// (default: https://utopian.io).
    pub web_base: String,

    /// Base URL of the repository directory API (default: https://api.github.com).
    pub directory_base: String,

    /// Static API key id forwarded on every upstream request.
    pub api_key_id: Option<String>,

    /// Static API key forwarded on every upstream request.
    pub api_key: Option<String>,

    /// Origin string forwarded on every upstream request.
    pub origin: Option<String>,

    /// Per-request timeout (default: 30s).
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// Load upstream settings from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_base = base_url_var("UPSTREAM_API_BASE", "https://api.utopian.io/api")?;
        let web_base = base_url_var("UPSTREAM_WEB_BASE", "https://utopian.io")?;
        let directory_base = base_url_var("DIRECTORY_API_BASE", "https://api.github.com")?;

        let timeout_secs: u64 = env::var("UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("UPSTREAM_TIMEOUT_SECS must be a valid u64")?;

        Ok(Self {
            api_base,
            web_base,
            directory_base,
            api_key_id: env::var("UPSTREAM_API_KEY_ID").ok(),
            api_key: env::var("UPSTREAM_API_KEY").ok(),
            origin: env::var("UPSTREAM_ORIGIN").ok(),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Read a base-URL variable with a default, validating it parses and
/// stripping any trailing slash so path joining stays uniform.
fn base_url_var(name: &str, default: &str) -> Result<String> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).with_context(|| format!("{name} must be a valid URL"))?;
    Ok(raw.trim_end_matches('/').to_string())
}
