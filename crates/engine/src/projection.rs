//! Per-record metric projection, ordering, and vote-queue classification.
//!
//! Upstream records are wide JSON objects; the dashboard only needs a handful
//! of derived fields. Everything here is defensive: a missing numeric field
//! is 0, a missing nested object yields an empty derived value, and nothing
//! in this module ever fails on a malformed record.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::query::Status;
use crate::types::Record;

/// Account whose vote marks a record as curated.
const CURATION_ACCOUNT: &str = "utopian-io";

/// Influence floor for queue entry while a record is pending review.
const QUEUE_MIN_INFLUENCE: f64 = 60.0;
/// Score floor for queue entry while a record is pending review.
const QUEUE_MIN_SCORE: f64 = 80.0;
/// Age at which a qualifying record enters the queue.
const QUEUE_AGE_HOURS: i64 = 48;

/// Reduced per-record projection served by listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedPost {
    pub author: String,
    pub title: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    pub category: String,
    pub project: String,
    pub score: f64,
    pub influence: f64,
    pub scorers: u64,
    #[serde(rename = "_links")]
    pub links: PostLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostLinks {
    pub canonical: String,
}

/// Project one record into its reduced dashboard shape.
///
/// The displayed category comes from the record's metadata type; the
/// canonical link uses the top-level category the upstream web frontend
/// routes on. The two usually agree but are distinct fields upstream.
pub fn project(record: &Record, web_base: &str) -> ProjectedPost {
    ProjectedPost {
        author: str_field(record, &["author"]).to_string(),
        title: str_field(record, &["title"]).to_string(),
        created_at: str_field(record, &["created"]).to_string(),
        category: str_field(record, &["json_metadata", "type"]).to_string(),
        project: project_name(record).to_string(),
        score: score(record),
        influence: influence(record),
        scorers: scorers(record),
        links: PostLinks {
            canonical: canonical_link(record, web_base),
        },
    }
}

/// Canonical web link for a record: `base/category/@author/permlink`.
pub fn canonical_link(record: &Record, web_base: &str) -> String {
    format!(
        "{}/{}/@{}/{}",
        web_base,
        str_field(record, &["category"]),
        str_field(record, &["author"]),
        str_field(record, &["permlink"]),
    )
}

pub fn score(record: &Record) -> f64 {
    numeric(dig(record, &["json_metadata", "score"]))
}

pub fn influence(record: &Record) -> f64 {
    numeric(dig(record, &["json_metadata", "total_influence"]))
}

/// Number of reviewers that scored the record's questionnaire.
pub fn scorers(record: &Record) -> u64 {
    dig(record, &["json_metadata", "questions", "voters"])
        .and_then(Value::as_array)
        .map_or(0, |voters| voters.len() as u64)
}

pub fn project_name(record: &Record) -> &str {
    dig(record, &["json_metadata", "repository", "full_name"])
        .and_then(Value::as_str)
        .unwrap_or_default()
}

/// Traverse a path of object keys.
fn dig<'a>(record: &'a Record, path: &[&str]) -> Option<&'a Value> {
    let mut current = record;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}

fn str_field<'a>(record: &'a Record, path: &[&str]) -> &'a str {
    dig(record, path).and_then(Value::as_str).unwrap_or_default()
}

/// Numeric coercion matching the upstream's loose typing: numbers pass
/// through, numeric strings parse, everything else is 0.
fn numeric(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Sortable projection keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Score,
    Influence,
    Author,
    Project,
    Scorers,
}

/// A parsed sort request: key plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub descending: bool,
}

impl SortSpec {
    /// Parse a caller-supplied sort key. A leading `-` flips the direction;
    /// an unrecognized key is `None` (callers keep upstream order).
    pub fn parse(raw: &str) -> Option<Self> {
        let (descending, key) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let key = match key {
            "score" => SortKey::Score,
            "influence" => SortKey::Influence,
            "author" => SortKey::Author,
            "project" => SortKey::Project,
            "scorers" => SortKey::Scorers,
            _ => return None,
        };

        Some(Self { key, descending })
    }
}

/// Order records by a caller-selected key, keeping upstream order for ties
/// and for absent/unrecognized keys.
pub fn sort_posts(records: &mut [Record], raw_key: Option<&str>) {
    let Some(spec) = raw_key.and_then(SortSpec::parse) else {
        return;
    };

    // sort_by is stable: tied records keep their upstream relative order.
    records.sort_by(|a, b| {
        let ordering = match spec.key {
            SortKey::Score => score(a).total_cmp(&score(b)),
            SortKey::Influence => influence(a).total_cmp(&influence(b)),
            SortKey::Scorers => scorers(a).cmp(&scorers(b)),
            SortKey::Author => compare_names(str_field(a, &["author"]), str_field(b, &["author"])),
            SortKey::Project => compare_names(project_name(a), project_name(b)),
        };
        if spec.descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

/// Case-insensitive name comparison. The upstream restricts account and
/// repository names to ASCII, so lowercasing is a faithful collation.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Where a record stands relative to the curation vote queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteQueueStatus {
    NotInQueue,
    ToBeInQueue,
    InQueue,
    Voted,
}

impl std::fmt::Display for VoteQueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VoteQueueStatus::NotInQueue => "Not in queue",
            VoteQueueStatus::ToBeInQueue => "To be in queue",
            VoteQueueStatus::InQueue => "In queue",
            VoteQueueStatus::Voted => "Voted",
        };
        f.write_str(s)
    }
}

/// Classify a record against the vote queue.
///
/// A curation vote wins over everything else. Otherwise a record qualifies
/// on score/influence thresholds (stricter while pending review) and moves
/// from "to be in queue" to "in queue" once it is 48 hours old.
pub fn vote_queue_status(record: &Record, status: Status, now: DateTime<Utc>) -> VoteQueueStatus {
    if has_curation_vote(record) {
        return VoteQueueStatus::Voted;
    }

    let qualifies = match status {
        Status::Pending => {
            influence(record) >= QUEUE_MIN_INFLUENCE && score(record) >= QUEUE_MIN_SCORE
        }
        _ => influence(record) > 0.0 && score(record) > 0.0,
    };
    if !qualifies {
        return VoteQueueStatus::NotInQueue;
    }

    let in_queue = created_at(record)
        .is_some_and(|created| now - created >= Duration::hours(QUEUE_AGE_HOURS));
    if in_queue {
        VoteQueueStatus::InQueue
    } else {
        VoteQueueStatus::ToBeInQueue
    }
}

fn has_curation_vote(record: &Record) -> bool {
    record
        .get("active_votes")
        .and_then(Value::as_array)
        .is_some_and(|votes| {
            votes
                .iter()
                .any(|vote| vote.get("voter").and_then(Value::as_str) == Some(CURATION_ACCOUNT))
        })
}

/// Parse the upstream `created` timestamp. The upstream emits naive
/// ISO-8601 seconds in UTC; full RFC 3339 is accepted as well.
fn created_at(record: &Record) -> Option<DateTime<Utc>> {
    let raw = record.get("created")?.as_str()?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
