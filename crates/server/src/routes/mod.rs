//! HTTP route modules, one per resource family.

pub mod health;
pub mod info;
pub mod moderators;
pub mod posts;
pub mod sponsors;
pub mod teams;

use axum::Router;

use crate::state::AppState;

/// Assemble every route module into the application router.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(info::router())
        .merge(health::router())
        .merge(moderators::router())
        .merge(teams::router())
        .merge(sponsors::router())
        .merge(posts::router())
        .with_state(state)
}
