//! Supervisor team endpoints.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use curata_engine::types::{Team, TeamRoster};

use crate::error::AppResult;
use crate::state::AppState;

async fn list_teams(State(state): State<AppState>) -> AppResult<Json<TeamRoster>> {
    Ok(Json(state.moderators().teams().await?))
}

async fn get_team(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<Team>> {
    Ok(Json(state.moderators().team(&name).await?))
}

/// Create the teams router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/teams", get(list_teams))
        .route("/teams/{name}", get(get_team))
}
