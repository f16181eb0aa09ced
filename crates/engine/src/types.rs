//! Core data types shared across the engine.
//!
//! Posts are kept as opaque JSON objects: the upstream record shape is wide,
//! loosely specified, and mostly passed through. Moderators and sponsors get
//! typed structs with the well-known fields named and everything else carried
//! in a flattened extra map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One upstream record, kept opaque.
pub type Record = serde_json::Value;

/// A page of upstream records together with the upstream-reported total.
///
/// `total` is authoritative and may exceed the number of records in any
/// single batch; it is never recomputed locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordBatch {
    pub total: u64,
    #[serde(default)]
    pub results: Vec<Record>,
}

/// An upstream moderator record.
///
/// Only `account` is required; every other field defaults when the upstream
/// omits it. Unknown fields round-trip through `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Moderator {
    pub account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default)]
    pub supermoderator: bool,
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub total_moderated: i64,
    #[serde(default)]
    pub total_paid_rewards_steem: f64,
    #[serde(default)]
    pub opted_out: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One supervisor's team, rebuilt fresh on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub account: String,
    pub moderators: Vec<Moderator>,
    pub moderators_count: usize,
}

/// All teams keyed by supervisor account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRoster {
    pub total: usize,
    pub results: BTreeMap<String, Team>,
}

/// An upstream sponsor record, opaque beyond the account key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sponsor {
    pub account: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Per-category review counts, summed from three independent probes.
///
/// `total = approved + rejected + pending` holds only when the probes ran
/// against a consistent upstream snapshot; it is a best-effort figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub total: u64,
    pub approved: u64,
    pub rejected: u64,
    pub pending: u64,
}

impl CategoryBreakdown {
    pub fn new(approved: u64, rejected: u64, pending: u64) -> Self {
        Self {
            total: approved + rejected + pending,
            approved,
            rejected,
            pending,
        }
    }
}
