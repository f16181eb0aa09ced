//! Moderator directory and the supervisor/team hierarchy.
//!
//! The upstream serves moderators as one flat list in which team membership
//! is a back-reference: each regular moderator names its supervisor in
//! `referrer`. The roster is rebuilt from scratch on every call with an
//! arena-style two-pass build — index the roots, then link the children —
//! so no parent pointers and no recursion are involved.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::transport::{Resource, Transport};
use crate::types::{Moderator, Team, TeamRoster};

/// Moderator directory scans and team building.
#[derive(Clone)]
pub struct ModeratorsService {
    transport: Arc<dyn Transport>,
}

impl ModeratorsService {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fetch the full moderator list.
    ///
    /// Individual records that do not deserialize are dropped with a debug
    /// diagnostic; a malformed record never fails the listing.
    pub async fn moderators(&self) -> EngineResult<Vec<Moderator>> {
        let batch = self
            .transport
            .fetch_batch(Resource::Moderators, &[])
            .await?;

        let mut moderators = Vec::with_capacity(batch.results.len());
        let mut dropped = 0usize;
        for record in batch.results {
            match serde_json::from_value::<Moderator>(record) {
                Ok(moderator) => moderators.push(moderator),
                Err(_) => dropped += 1,
            }
        }
        if dropped > 0 {
            debug!(dropped, "malformed moderator records skipped");
        }

        Ok(moderators)
    }

    /// Look up a single active moderator by account.
    pub async fn moderator(&self, name: &str) -> EngineResult<Moderator> {
        self.moderators()
            .await?
            .into_iter()
            .find(|m| m.account == name && !m.banned)
            .ok_or_else(|| EngineError::not_found("moderator", name))
    }

    /// All moderators with supervisor standing.
    pub async fn supervisors(&self) -> EngineResult<Vec<Moderator>> {
        Ok(self
            .moderators()
            .await?
            .into_iter()
            .filter(|m| m.supermoderator)
            .collect())
    }

    /// Rebuild the full team roster from the current moderator list.
    pub async fn teams(&self) -> EngineResult<TeamRoster> {
        Ok(build_teams(&self.moderators().await?))
    }

    /// One supervisor's team from a fresh roster build.
    pub async fn team(&self, supervisor: &str) -> EngineResult<Team> {
        let mut roster = self.teams().await?;
        roster
            .results
            .remove(supervisor)
            .ok_or_else(|| EngineError::not_found("team", supervisor))
    }
}

impl std::fmt::Debug for ModeratorsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeratorsService").finish()
    }
}

/// Build the supervisor/team forest from a flat moderator list.
///
/// Pass 1 creates a team for every root: a moderator with supervisor
/// standing or no referrer at all. Pass 2 attaches each remaining moderator
/// to its referrer's team. A referrer that matches no root drops the
/// moderator from every team; the roster itself is unaffected.
pub fn build_teams(moderators: &[Moderator]) -> TeamRoster {
    let mut results: BTreeMap<String, Team> = BTreeMap::new();

    for moderator in moderators {
        if moderator.supermoderator || is_rootless(moderator) {
            results.insert(
                moderator.account.clone(),
                Team {
                    account: moderator.account.clone(),
                    moderators: Vec::new(),
                    moderators_count: 0,
                },
            );
        }
    }

    let mut dropped = 0usize;
    for moderator in moderators {
        if moderator.supermoderator || is_rootless(moderator) {
            continue;
        }
        // Referrer is present and non-empty here.
        let referrer = moderator.referrer.as_deref().unwrap_or_default();
        match results.get_mut(referrer) {
            Some(team) => {
                team.moderators.push(moderator.clone());
                team.moderators_count += 1;
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(dropped, "moderators with unknown referrer excluded from all teams");
    }

    TeamRoster {
        total: results.len(),
        results,
    }
}

/// A moderator with no (or an empty) referrer heads its own team.
fn is_rootless(moderator: &Moderator) -> bool {
    moderator.referrer.as_deref().is_none_or(str::is_empty)
}
