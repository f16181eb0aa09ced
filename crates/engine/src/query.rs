//! Logical post queries and their upstream wire encoding.
//!
//! The upstream API encodes the pending review state through a different
//! query parameter (`filterBy=review`) than the reviewed/flagged states
//! (`status=...`). That translation is confined to [`PostQuery::params`];
//! everything else in the engine only ever sees the canonical [`Status`].

use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

/// Canonical review status of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    Reviewed,
    Flagged,
    Pending,
    #[default]
    Any,
}

impl Status {
    /// Statuses probed when building the full review matrix.
    pub const PROBED: [Status; 3] = [Status::Reviewed, Status::Flagged, Status::Pending];
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Reviewed => "reviewed",
            Status::Flagged => "flagged",
            Status::Pending => "pending",
            Status::Any => "any",
        };
        f.write_str(s)
    }
}

impl FromStr for Status {
    type Err = EngineError;

    /// Parse a caller-facing status segment. `unreviewed` is an accepted
    /// alias for `pending`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reviewed" => Ok(Status::Reviewed),
            "flagged" => Ok(Status::Flagged),
            "pending" | "unreviewed" => Ok(Status::Pending),
            "any" => Ok(Status::Any),
            other => Err(EngineError::Validation(format!(
                "unknown status '{other}'"
            ))),
        }
    }
}

/// Which slice of the upstream corpus a query addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    All,
    Author,
    Project,
}

/// A logical post query, potentially larger than one upstream batch.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    /// Wanted record count. Absent or negative defaults to 20; an explicit 0
    /// means "no records".
    pub limit: Option<i64>,
    /// Starting offset. Absent or negative defaults to 0.
    pub skip: Option<i64>,
    /// Category filter (the upstream `type` parameter).
    pub category: Option<String>,
    pub status: Status,
    /// Upstream-side sort key, forwarded verbatim when present.
    pub sort_by: Option<String>,
    pub section: Section,
    pub author: Option<String>,
    pub project_id: Option<i64>,
    pub platform: Option<String>,
    pub moderator: Option<String>,
}

impl PostQuery {
    /// A cardinality probe: one record requested purely for its reported total.
    pub fn probe(category: &str, status: Status) -> Self {
        Self {
            limit: Some(1),
            category: Some(category.to_string()),
            status,
            ..Self::default()
        }
    }

    /// The caller's wanted record count after defaulting.
    pub fn wanted(&self) -> u64 {
        match self.limit {
            None => 20,
            Some(n) if n < 0 => 20,
            Some(n) => n as u64,
        }
    }

    /// The starting skip cursor after defaulting.
    pub fn start_skip(&self) -> u64 {
        self.skip.map_or(0, |n| n.max(0) as u64)
    }

    /// Wire parameters for one sub-fetch at the given page size and cursor.
    ///
    /// This is the single point where pending is rewritten to the upstream's
    /// `filterBy=review` encoding.
    pub fn params(&self, page: u64, skip: u64) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", page.to_string()), ("skip", skip.to_string())];

        if let Some(category) = &self.category {
            params.push(("type", category.clone()));
        }

        match self.status {
            Status::Pending => params.push(("filterBy", "review".to_string())),
            status => params.push(("status", status.to_string())),
        }

        match self.section {
            Section::All => {}
            Section::Author => params.push(("section", "author".to_string())),
            Section::Project => params.push(("section", "project".to_string())),
        }

        if let Some(author) = &self.author {
            params.push(("author", author.clone()));
        }
        if let Some(id) = self.project_id {
            params.push(("projectId", id.to_string()));
        }
        if let Some(platform) = &self.platform {
            params.push(("platform", platform.clone()));
        }
        if let Some(moderator) = &self.moderator {
            params.push(("moderator", moderator.clone()));
        }
        if let Some(sort_by) = &self.sort_by {
            params.push(("sortBy", sort_by.clone()));
        }

        params
    }
}
