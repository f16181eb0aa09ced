//! Post aggregation: chunked fetching and count matrices.
//!
//! The upstream caps every request at [`BATCH_CAP`] records. Large logical
//! pages are satisfied by sequential sub-fetches with a moving skip cursor;
//! count matrices fan out one probe per (category, status) pair.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::query::{PostQuery, Status};
use crate::transport::{Resource, Transport};
use crate::types::{CategoryBreakdown, Record, RecordBatch};

/// Maximum records the upstream returns for a single request.
pub const BATCH_CAP: u64 = 500;

/// Post fetching and count aggregation.
#[derive(Clone)]
pub struct PostsService {
    transport: Arc<dyn Transport>,
    probe_concurrency: Option<usize>,
}

impl PostsService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            probe_concurrency: None,
        }
    }

    /// Bound the number of concurrently in-flight count probes. The default
    /// is unbounded fan-out, which is fine for the small fixed category list.
    pub fn with_probe_concurrency(mut self, limit: usize) -> Self {
        self.probe_concurrency = Some(limit.max(1));
        self
    }

    /// Satisfy a logical page request by merging sequential bounded
    /// sub-fetches.
    ///
    /// Sub-fetches advance the skip cursor by the requested page size, so
    /// each one depends on the one before it; they are never issued
    /// concurrently. The loop stops once the wanted count is reached, the
    /// most recent upstream-reported total falls at or below the cumulative
    /// skip, or the upstream returns an empty batch (a total that shrinks
    /// mid-sequence must not spin the loop).
    pub async fn fetch_posts(&self, query: &PostQuery) -> EngineResult<RecordBatch> {
        let wanted = query.wanted();
        if wanted == 0 {
            return Ok(RecordBatch::default());
        }

        let mut skip = query.start_skip();
        let mut results: Vec<Record> = Vec::new();
        let mut total = 0u64;

        loop {
            let page = (wanted - results.len() as u64).min(BATCH_CAP);
            let batch = self
                .transport
                .fetch_batch(Resource::Posts, &query.params(page, skip))
                .await?;

            total = batch.total;
            let received = batch.results.len();
            results.extend(batch.results);
            skip += page;

            if results.len() as u64 >= wanted || total <= skip || received == 0 {
                break;
            }
        }

        results.truncate(wanted as usize);
        debug!(wanted, merged = results.len(), total, "chunked fetch complete");

        Ok(RecordBatch { total, results })
    }

    /// Cardinality probe: request one record purely for its reported total.
    pub async fn count(&self, category: &str, status: Status) -> EngineResult<u64> {
        let query = PostQuery::probe(category, status);
        let batch = self
            .transport
            .fetch_batch(Resource::Posts, &query.params(1, 0))
            .await?;
        Ok(batch.total)
    }

    /// Assemble the full review matrix: one [`CategoryBreakdown`] per input
    /// category, in input order.
    ///
    /// All `3 × |categories|` probes run concurrently; any failing probe
    /// fails the whole matrix and aborts the probes still in flight. A
    /// partial matrix with silently zeroed categories is never returned.
    pub async fn review_stats(
        &self,
        categories: &[&str],
    ) -> EngineResult<Vec<(String, CategoryBreakdown)>> {
        let limiter = self.probe_concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let mut probes: JoinSet<EngineResult<(usize, usize, u64)>> = JoinSet::new();

        for (category_idx, category) in categories.iter().enumerate() {
            for (status_idx, status) in Status::PROBED.iter().enumerate() {
                let service = self.clone();
                let category = category.to_string();
                let status = *status;
                let limiter = limiter.clone();

                probes.spawn(async move {
                    let _permit = match limiter {
                        Some(semaphore) => Some(semaphore.acquire_owned().await.map_err(|_| {
                            EngineError::Upstream("probe pool closed".to_string())
                        })?),
                        None => None,
                    };
                    let total = service.count(&category, status).await?;
                    Ok((category_idx, status_idx, total))
                });
            }
        }

        let mut counts = vec![[0u64; 3]; categories.len()];
        while let Some(joined) = probes.join_next().await {
            let (category_idx, status_idx, total) =
                joined.map_err(|e| EngineError::Upstream(format!("count probe failed: {e}")))??;
            counts[category_idx][status_idx] = total;
        }

        Ok(categories
            .iter()
            .zip(counts)
            .map(|(category, [approved, rejected, pending])| {
                (
                    category.to_string(),
                    CategoryBreakdown::new(approved, rejected, pending),
                )
            })
            .collect())
    }

    /// One count per input category for a single status, in input order.
    /// Same concurrency and fail-fast semantics as [`Self::review_stats`].
    pub async fn status_counts(
        &self,
        categories: &[&str],
        status: Status,
    ) -> EngineResult<Vec<(String, u64)>> {
        let limiter = self.probe_concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let mut probes: JoinSet<EngineResult<(usize, u64)>> = JoinSet::new();

        for (category_idx, category) in categories.iter().enumerate() {
            let service = self.clone();
            let category = category.to_string();
            let limiter = limiter.clone();

            probes.spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => Some(semaphore.acquire_owned().await.map_err(|_| {
                        EngineError::Upstream("probe pool closed".to_string())
                    })?),
                    None => None,
                };
                let total = service.count(&category, status).await?;
                Ok((category_idx, total))
            });
        }

        let mut counts = vec![0u64; categories.len()];
        while let Some(joined) = probes.join_next().await {
            let (category_idx, total) =
                joined.map_err(|e| EngineError::Upstream(format!("count probe failed: {e}")))??;
            counts[category_idx] = total;
        }

        Ok(categories
            .iter()
            .zip(counts)
            .map(|(category, total)| (category.to_string(), total))
            .collect())
    }

    /// Fetch one post by author and permlink.
    pub async fn fetch_post(&self, author: &str, permlink: &str) -> EngineResult<Record> {
        if author.is_empty() || permlink.is_empty() {
            return Err(EngineError::Validation(
                "author and permlink are required".to_string(),
            ));
        }

        self.transport
            .fetch_record(Resource::Posts, &[author, permlink])
            .await
    }
}

impl std::fmt::Debug for PostsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostsService")
            .field("probe_concurrency", &self.probe_concurrency)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::transport::mock::MockTransport;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Serves records with sequential ids out of a corpus of `total`.
    fn paged_corpus(total: u64) -> MockTransport {
        MockTransport::new(move |_, params| {
            let skip: u64 = param(params, "skip").unwrap().parse().unwrap();
            let limit: u64 = param(params, "limit").unwrap().parse().unwrap();
            let end = (skip + limit).min(total);
            let results = (skip..end).map(|i| json!({ "id": i })).collect();
            Ok(RecordBatch { total, results })
        })
    }

    fn ids(batch: &RecordBatch) -> Vec<u64> {
        batch
            .results
            .iter()
            .map(|r| r["id"].as_u64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn merges_chunks_in_upstream_order() {
        let transport = Arc::new(paged_corpus(2000));
        let service = PostsService::new(transport.clone());

        let query = PostQuery {
            limit: Some(1200),
            ..PostQuery::default()
        };
        let batch = service.fetch_posts(&query).await.unwrap();

        assert_eq!(batch.total, 2000);
        assert_eq!(batch.results.len(), 1200);
        assert_eq!(ids(&batch), (0..1200).collect::<Vec<_>>());
        // Three sub-fetches: two full pages and the 200-record remainder.
        assert_eq!(transport.cursors(), vec![(0, 500), (500, 500), (1000, 200)]);
    }

    #[tokio::test]
    async fn stops_when_total_is_exhausted() {
        let transport = Arc::new(paged_corpus(30));
        let service = PostsService::new(transport.clone());

        let query = PostQuery {
            limit: Some(100),
            ..PostQuery::default()
        };
        let batch = service.fetch_posts(&query).await.unwrap();

        assert_eq!(batch.total, 30);
        assert_eq!(ids(&batch), (0..30).collect::<Vec<_>>());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn zero_limit_issues_no_requests() {
        let transport = Arc::new(paged_corpus(100));
        let service = PostsService::new(transport.clone());

        let query = PostQuery {
            limit: Some(0),
            ..PostQuery::default()
        };
        let batch = service.fetch_posts(&query).await.unwrap();

        assert_eq!(batch.total, 0);
        assert!(batch.results.is_empty());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_upstream_terminates_immediately() {
        let transport = Arc::new(paged_corpus(0));
        let service = PostsService::new(transport.clone());

        let batch = service.fetch_posts(&PostQuery::default()).await.unwrap();

        assert_eq!(batch.total, 0);
        assert!(batch.results.is_empty());
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn absent_limit_defaults_to_twenty() {
        let transport = Arc::new(paged_corpus(100));
        let service = PostsService::new(transport.clone());

        let batch = service.fetch_posts(&PostQuery::default()).await.unwrap();

        assert_eq!(batch.results.len(), 20);
        assert_eq!(transport.cursors(), vec![(0, 20)]);
    }

    #[tokio::test]
    async fn skip_offsets_the_window() {
        let transport = Arc::new(paged_corpus(100));
        let service = PostsService::new(transport.clone());

        let query = PostQuery {
            limit: Some(10),
            skip: Some(90),
            ..PostQuery::default()
        };
        let batch = service.fetch_posts(&query).await.unwrap();

        assert_eq!(ids(&batch), (90..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn sub_fetch_failure_fails_the_whole_fetch() {
        let transport = Arc::new(MockTransport::new(|_, params| {
            let skip: u64 = param(params, "skip").unwrap().parse().unwrap();
            if skip >= 500 {
                return Err(EngineError::Upstream("boom".to_string()));
            }
            Ok(RecordBatch {
                total: 1000,
                results: (skip..skip + 500).map(|i| json!({ "id": i })).collect(),
            })
        }));
        let service = PostsService::new(transport);

        let query = PostQuery {
            limit: Some(700),
            ..PostQuery::default()
        };
        let err = service.fetch_posts(&query).await.unwrap_err();

        assert!(matches!(err, EngineError::Upstream(_)));
    }

    #[tokio::test]
    async fn misreported_total_does_not_spin() {
        // Upstream claims a huge total but serves nothing past record 10.
        let transport = Arc::new(MockTransport::new(|_, params| {
            let skip: u64 = param(params, "skip").unwrap().parse().unwrap();
            let results = if skip >= 10 {
                Vec::new()
            } else {
                (skip..10).map(|i| json!({ "id": i })).collect()
            };
            Ok(RecordBatch {
                total: 1_000_000,
                results,
            })
        }));
        let service = PostsService::new(transport.clone());

        let query = PostQuery {
            limit: Some(600),
            ..PostQuery::default()
        };
        let batch = service.fetch_posts(&query).await.unwrap();

        assert_eq!(batch.results.len(), 10);
        assert_eq!(transport.call_count(), 2);
    }

    fn matrix_corpus() -> MockTransport {
        MockTransport::new(|_, params| {
            let category = param(params, "type").unwrap().to_string();
            let pending = param(params, "filterBy") == Some("review");
            let status = param(params, "status").unwrap_or("pending");

            assert_eq!(param(params, "limit"), Some("1"));

            let total = match (category.as_str(), pending, status) {
                ("blog", false, "reviewed") => 5,
                ("blog", false, "flagged") => 2,
                ("blog", true, _) => 3,
                ("ideas", _, _) => 0,
                _ => panic!("unexpected probe: {category} {status} pending={pending}"),
            };
            Ok(RecordBatch {
                total,
                results: vec![json!({})],
            })
        })
    }

    #[tokio::test]
    async fn review_stats_orders_by_input_list() {
        let service = PostsService::new(Arc::new(matrix_corpus()));

        let stats = service.review_stats(&["blog", "ideas"]).await.unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].0, "blog");
        assert_eq!(stats[0].1, CategoryBreakdown::new(5, 2, 3));
        assert_eq!(stats[0].1.total, 10);
        assert_eq!(stats[1].0, "ideas");
        assert_eq!(stats[1].1, CategoryBreakdown::default());
    }

    #[tokio::test]
    async fn review_stats_respects_probe_ceiling() {
        let service = PostsService::new(Arc::new(matrix_corpus())).with_probe_concurrency(2);

        let stats = service.review_stats(&["blog", "ideas"]).await.unwrap();

        assert_eq!(stats[0].1.total, 10);
    }

    #[tokio::test]
    async fn review_stats_fails_fast_on_any_probe() {
        let transport = Arc::new(MockTransport::new(|_, params| {
            if param(params, "type") == Some("ideas") {
                return Err(EngineError::Upstream("boom".to_string()));
            }
            Ok(RecordBatch {
                total: 1,
                results: vec![json!({})],
            })
        }));
        let service = PostsService::new(transport);

        let err = service.review_stats(&["blog", "ideas"]).await.unwrap_err();

        assert!(matches!(err, EngineError::Upstream(_)));
    }

    #[tokio::test]
    async fn status_counts_single_status_sweep() {
        let transport = Arc::new(MockTransport::new(|_, params| {
            assert_eq!(param(params, "status"), Some("flagged"));
            let total = match param(params, "type").unwrap() {
                "blog" => 7,
                _ => 0,
            };
            Ok(RecordBatch {
                total,
                results: vec![json!({})],
            })
        }));
        let service = PostsService::new(transport);

        let counts = service
            .status_counts(&["blog", "ideas"], Status::Flagged)
            .await
            .unwrap();

        assert_eq!(counts, vec![("blog".to_string(), 7), ("ideas".to_string(), 0)]);
    }

    #[tokio::test]
    async fn fetch_post_requires_author_and_permlink() {
        let transport = Arc::new(paged_corpus(0));
        let service = PostsService::new(transport);

        let err = service.fetch_post("", "some-post").await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let err = service.fetch_post("alice", "").await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn fetch_post_returns_scripted_record() {
        let record = json!({ "author": "alice", "permlink": "intro" });
        let transport = Arc::new(paged_corpus(0).with_record(record.clone()));
        let service = PostsService::new(transport);

        let post = service.fetch_post("alice", "intro").await.unwrap();
        assert_eq!(post, record);
    }
}
