//! Service info endpoint: name, version, and a route index.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::state::AppState;

async fn service_info(State(state): State<AppState>) -> Json<Value> {
    let site = &state.config().site_url;

    Json(json!({
        "app": "curata",
        "version": env!("CARGO_PKG_VERSION"),
        "routes": {
            "moderators": format!("{site}/moderators"),
            "supervisors": format!("{site}/supervisors"),
            "teams": format!("{site}/teams"),
            "sponsors": format!("{site}/sponsors"),
            "posts_stats": format!("{site}/posts/stats"),
            "posts": format!("{site}/posts/{{status}}/{{category}}"),
        },
    }))
}

/// Create the service info router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(service_info))
}
