//! Moderator directory endpoints.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use curata_engine::types::Moderator;
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

/// A listing wrapper mirroring the upstream's `{total, results}` envelope.
#[derive(Serialize)]
pub struct DirectoryResponse<T> {
    pub total: usize,
    pub results: Vec<T>,
}

impl<T> From<Vec<T>> for DirectoryResponse<T> {
    fn from(results: Vec<T>) -> Self {
        Self {
            total: results.len(),
            results,
        }
    }
}

/// Reduced moderator shape for the listing endpoint.
#[derive(Serialize)]
struct ModeratorSummary {
    account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    referrer: Option<String>,
    supervisor: bool,
    total_moderated: i64,
    banned: bool,
    total_paid: f64,
    opted_out: bool,
}

impl From<Moderator> for ModeratorSummary {
    fn from(m: Moderator) -> Self {
        Self {
            account: m.account,
            referrer: m.referrer,
            supervisor: m.supermoderator,
            total_moderated: m.total_moderated,
            banned: m.banned,
            total_paid: m.total_paid_rewards_steem,
            opted_out: m.opted_out,
        }
    }
}

async fn list_moderators(
    State(state): State<AppState>,
) -> AppResult<Json<DirectoryResponse<ModeratorSummary>>> {
    let moderators = state.moderators().moderators().await?;
    let summaries: Vec<ModeratorSummary> =
        moderators.into_iter().map(ModeratorSummary::from).collect();
    Ok(Json(summaries.into()))
}

async fn get_moderator(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<Moderator>> {
    Ok(Json(state.moderators().moderator(&name).await?))
}

async fn list_supervisors(
    State(state): State<AppState>,
) -> AppResult<Json<DirectoryResponse<Moderator>>> {
    let supervisors = state.moderators().supervisors().await?;
    Ok(Json(supervisors.into()))
}

/// Create the moderators router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/moderators", get(list_moderators))
        .route("/moderators/{name}", get(get_moderator))
        .route("/supervisors", get(list_supervisors))
}
