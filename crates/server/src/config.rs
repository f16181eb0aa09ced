//! Server configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};
use curata_engine::UpstreamConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Public base URL for constructing pagination links
    /// (default: http://localhost:PORT).
    pub site_url: String,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Upstream API connection settings.
    pub upstream: UpstreamConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let site_url = env::var("SITE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let upstream = UpstreamConfig::from_env().context("failed to load upstream settings")?;

        Ok(Self {
            port,
            site_url,
            cors_allowed_origins,
            upstream,
        })
    }
}
