//! Batch transport against the upstream API.
//!
//! One bounded request/response cycle per call. The trait seam exists so
//! aggregation logic can be exercised against a scripted transport; the
//! production implementation is a reqwest client with a per-request timeout
//! and the static API-key headers attached.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::UpstreamConfig;
use crate::error::{EngineError, EngineResult};
use crate::types::{Record, RecordBatch};

/// Header carrying the static API key id.
const HEADER_API_KEY_ID: &str = "x-api-key-id";
/// Header carrying the static API key.
const HEADER_API_KEY: &str = "x-api-key";
/// Header carrying the configured origin string.
const HEADER_ORIGIN: &str = "origin";

/// Upstream resource collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Posts,
    Moderators,
    Sponsors,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Resource::Posts => "posts",
            Resource::Moderators => "moderators",
            Resource::Sponsors => "sponsors",
        }
    }
}

/// A single bounded fetch against the upstream API.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch one batch of records. The upstream accepts at most 500 records
    /// per call; callers are responsible for chunking above that.
    async fn fetch_batch(
        &self,
        resource: Resource,
        params: &[(&'static str, String)],
    ) -> EngineResult<RecordBatch>;

    /// Fetch a single record addressed by extra path segments under the
    /// resource collection (the individual-post lookup).
    async fn fetch_record(&self, resource: Resource, segments: &[&str]) -> EngineResult<Record>;
}

/// Percent-encode query parameters into a query string.
pub fn encode_query(params: &[(&'static str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Production transport: HTTP GET with API-key headers and timeout.
pub struct HttpTransport {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl HttpTransport {
    pub fn new(config: UpstreamConfig) -> EngineResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(EngineError::Network)?;

        Ok(Self { client, config })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> EngineResult<T> {
        let mut request = self.client.get(&url);

        if let Some(key_id) = &self.config.api_key_id {
            request = request.header(HEADER_API_KEY_ID, key_id);
        }
        if let Some(key) = &self.config.api_key {
            request = request.header(HEADER_API_KEY, key);
        }
        if let Some(origin) = &self.config.origin {
            request = request.header(HEADER_ORIGIN, origin);
        }

        let response = request.send().await.map_err(EngineError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Upstream(format!(
                "upstream answered HTTP {status} for {url}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EngineError::Upstream(format!("malformed upstream payload: {e}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_batch(
        &self,
        resource: Resource,
        params: &[(&'static str, String)],
    ) -> EngineResult<RecordBatch> {
        let mut url = format!("{}/{}", self.config.api_base, resource.path());
        let query = encode_query(params);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }

        self.get_json(url).await
    }

    async fn fetch_record(&self, resource: Resource, segments: &[&str]) -> EngineResult<Record> {
        let mut url = format!("{}/{}", self.config.api_base, resource.path());
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }

        self.get_json(url).await
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("api_base", &self.config.api_base)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod mock {
    //! Scripted transport for engine unit tests.

    use std::sync::Mutex;

    use super::*;

    type BatchHandler =
        Box<dyn Fn(Resource, &[(&'static str, String)]) -> EngineResult<RecordBatch> + Send + Sync>;

    /// Transport whose batch responses come from a caller-supplied handler.
    /// Every call is recorded for assertions on skip/page progression.
    pub(crate) struct MockTransport {
        batch_handler: BatchHandler,
        record: Option<Record>,
        pub calls: Mutex<Vec<(Resource, Vec<(&'static str, String)>)>>,
    }

    impl MockTransport {
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
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_record(mut self, record: Record) -> Self {
            self.record = Some(record);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// The (skip, limit) pair of every recorded batch call, in order.
        pub fn cursors(&self) -> Vec<(u64, u64)> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, params)| {
                    let get = |key: &str| {
                        params
                            .iter()
                            .find(|(k, _)| *k == key)
                            .and_then(|(_, v)| v.parse::<u64>().ok())
                            .unwrap()
                    };
                    (get("skip"), get("limit"))
                })
                .collect()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn fetch_batch(
            &self,
            resource: Resource,
            params: &[(&'static str, String)],
        ) -> EngineResult<RecordBatch> {
            self.calls
                .lock()
                .unwrap()
                .push((resource, params.to_vec()));
            (self.batch_handler)(resource, params)
        }

        async fn fetch_record(
            &self,
            _resource: Resource,
            _segments: &[&str],
        ) -> EngineResult<Record> {
            self.record
                .clone()
                .ok_or_else(|| EngineError::Upstream("no record scripted".to_string()))
        }
    }
}
