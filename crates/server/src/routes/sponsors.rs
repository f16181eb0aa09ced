//! Sponsor directory endpoints.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use curata_engine::types::Sponsor;

use crate::error::AppResult;
use crate::routes::moderators::DirectoryResponse;
use crate::state::AppState;

async fn list_sponsors(
    State(state): State<AppState>,
) -> AppResult<Json<DirectoryResponse<Sponsor>>> {
    let sponsors = state.sponsors().sponsors().await?;
    Ok(Json(sponsors.into()))
}

async fn get_sponsor(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<Sponsor>> {
    Ok(Json(state.sponsors().sponsor(&name).await?))
}

/// Create the sponsors router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sponsors", get(list_sponsors))
        .route("/sponsors/{name}", get(get_sponsor))
}
