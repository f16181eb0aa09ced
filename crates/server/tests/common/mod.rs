#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for router integration tests.
//!
//! Tests drive the real router with `tower::ServiceExt::oneshot`; only the
//! outbound collaborators (upstream transport, repository directory) are
//! replaced with scripted implementations.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use curata_engine::{
    EngineError, EngineResult, Record, RecordBatch, RepoLookup, Resource, Transport,
    UpstreamConfig,
};
use curata_server::config::Config;
use curata_server::routes;
use curata_server::state::AppState;

pub const SITE: &str = "http://dash.test";
pub const WEB_BASE: &str = "http://web.test";

type BatchHandler =
    Box<dyn Fn(Resource, &[(&'static str, String)]) -> EngineResult<RecordBatch> + Send + Sync>;

/// Transport whose batch responses come from a caller-supplied handler.
pub struct ScriptedTransport {
    batch_handler: BatchHandler,
    record: Option<Record>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(Resource, &[(&'static str, String)]) -> EngineResult<RecordBatch>
            + Send
            + Sync
            + 'static,
    {
        Self {
            batch_handler: Box::new(handler),
            record: None,
        }
    }

    /// Serve a fixed batch for every request.
    pub fn fixed(batch: RecordBatch) -> Self {
        Self::new(move |_, _| {
            Ok(RecordBatch {
                total: batch.total,
                results: batch.results.clone(),
            })
        })
    }

    /// Fail every request with an upstream error.
    pub fn failing() -> Self {
        Self::new(|_, _| Err(EngineError::Upstream("scripted failure".to_string())))
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.record = Some(record);
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch_batch(
        &self,
        resource: Resource,
        params: &[(&'static str, String)],
    ) -> EngineResult<RecordBatch> {
        (self.batch_handler)(resource, params)
    }

    async fn fetch_record(&self, _resource: Resource, _segments: &[&str]) -> EngineResult<Record> {
        self.record
            .clone()
            .ok_or_else(|| EngineError::Upstream("no record scripted".to_string()))
    }
}

/// Directory lookup that resolves every name to one fixed id.
pub struct FixedRepoLookup(pub i64);

#[async_trait]
impl RepoLookup for FixedRepoLookup {
    async fn resolve_repository_id(&self, _full_name: &str) -> EngineResult<i64> {
        Ok(self.0)
    }
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        site_url: SITE.to_string(),
        cors_allowed_origins: vec!["*".to_string()],
        upstream: UpstreamConfig {
            api_base: "http://upstream.test/api".to_string(),
            web_base: WEB_BASE.to_string(),
            directory_base: "http://directory.test".to_string(),
            api_key_id: None,
            api_key: None,
            origin: None,
            timeout: Duration::from_secs(5),
        },
    }
}

/// Build the application router around a scripted transport.
pub fn app(transport: ScriptedTransport) -> Router {
    app_with_repo(transport, 0)
}

pub fn app_with_repo(transport: ScriptedTransport, repo_id: i64) -> Router {
    let state = AppState::with_collaborators(
        test_config(),
        Arc::new(transport),
        Arc::new(FixedRepoLookup(repo_id)),
    )
    .unwrap();
    routes::app_router(state)
}

/// Issue a GET and parse the response body as JSON.
pub async fn get_json(app: Router, path: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = get_raw(app, path).await;
    let value = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

/// Issue a GET and return the response body as text.
pub async fn get_text(app: Router, path: &str) -> (StatusCode, String) {
    let (status, body) = get_raw(app, path).await;
    (status, String::from_utf8(body).unwrap())
}

async fn get_raw(app: Router, path: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec();

    (status, body)
}
