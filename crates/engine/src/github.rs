//! Repository directory lookup.
//!
//! Callers may filter post listings by project name rather than numeric id;
//! the upstream only understands ids, so the name is resolved against the
//! code-hosting directory first.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{EngineError, EngineResult};

/// User agent sent to the directory API, which rejects anonymous clients.
const USER_AGENT: &str = concat!("curata/", env!("CARGO_PKG_VERSION"));

/// Name-to-id resolution seam.
#[async_trait]
pub trait RepoLookup: Send + Sync {
    /// Resolve `owner/repo` to the directory's numeric repository id.
    async fn resolve_repository_id(&self, full_name: &str) -> EngineResult<i64>;
}

/// Production lookup against the directory's REST API.
pub struct RepoDirectory {
    client: reqwest::Client,
    base: String,
}

impl RepoDirectory {
    pub fn new(base: impl Into<String>, timeout: Duration) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(EngineError::Network)?;

        Ok(Self {
            client,
            base: base.into(),
        })
    }
}

#[async_trait]
impl RepoLookup for RepoDirectory {
    async fn resolve_repository_id(&self, full_name: &str) -> EngineResult<i64> {
        let (owner, repo) = split_full_name(full_name)?;
        let url = format!(
            "{}/repos/{}/{}",
            self.base,
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(EngineError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Upstream(format!(
                "directory answered HTTP {status} for '{full_name}'"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| EngineError::Upstream(format!("malformed directory payload: {e}")))?;

        body.get("id")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| {
                EngineError::Upstream(format!("directory record for '{full_name}' has no id"))
            })
    }
}

impl std::fmt::Debug for RepoDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoDirectory")
            .field("base", &self.base)
            .finish()
    }
}

/// Split `owner/repo`, rejecting anything without exactly one separator.
fn split_full_name(full_name: &str) -> EngineResult<(&str, &str)> {
    match full_name.split_once('/') {
        Some((owner, repo))
            if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
        {
            Ok((owner, repo))
        }
        _ => Err(EngineError::Validation(format!(
            "project name '{full_name}' is not of the form owner/repo"
        ))),
    }
}
