//! Sponsor directory scans.

use std::sync::Arc;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::transport::{Resource, Transport};
use crate::types::Sponsor;

#[derive(Clone)]
pub struct SponsorsService {
    transport: Arc<dyn Transport>,
}

impl SponsorsService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch the full sponsor list, dropping records without an account key.
    pub async fn sponsors(&self) -> EngineResult<Vec<Sponsor>> {
        let batch = self.transport.fetch_batch(Resource::Sponsors, &[]).await?;

        let mut sponsors = Vec::with_capacity(batch.results.len());
        let mut dropped = 0usize;
        for record in batch.results {
            match serde_json::from_value::<Sponsor>(record) {
                Ok(sponsor) => sponsors.push(sponsor),
                Err(_) => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(dropped, "malformed sponsor records skipped");
        }

        Ok(sponsors)
    }

    /// Look up a single sponsor by account.
    pub async fn sponsor(&self, name: &str) -> EngineResult<Sponsor> {
        self.sponsors()
            .await?
            .into_iter()
            .find(|s| s.account == name)
            .ok_or_else(|| EngineError::not_found("sponsor", name))
    }
}

impl std::fmt::Debug for SponsorsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SponsorsService").finish()
    }
}
