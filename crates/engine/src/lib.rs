//! Curata aggregation engine.
//!
//! Read-only aggregation over a remote, paginated curation API:
//! - Chunked fetching that satisfies large logical pages with bounded requests
//! - Category/status count matrices assembled from concurrent probes
//! - Supervisor/team hierarchy rebuilt from a flat referrer relation
//! - Per-record metric projection, stable sorting, and pagination cursors

pub mod categories;
pub mod config;
pub mod error;
pub mod github;
pub mod moderators;
pub mod pagination;
pub mod posts;
pub mod projection;
pub mod query;
pub mod sponsors;
pub mod transport;
pub mod types;

pub use config::UpstreamConfig;
pub use error::{EngineError, EngineResult};
pub use github::{RepoDirectory, RepoLookup};
pub use moderators::ModeratorsService;
pub use posts::PostsService;
pub use query::{PostQuery, Section, Status};
pub use sponsors::SponsorsService;
pub use transport::{HttpTransport, Resource, Transport};
pub use types::{CategoryBreakdown, Moderator, Record, RecordBatch, Sponsor, Team, TeamRoster};
