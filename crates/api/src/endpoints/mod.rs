//! API endpoints.

mod auth;
mod followers;
mod metrics;
mod plugins;
mod posts;
mod themes;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router. Mounted under `/api` by the server.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/plugins", plugins::router())
        .nest("/themes", themes::router())
        .nest("/posts", posts::router())
        .nest("/followers", followers::router())
        .nest("/federation/metrics", metrics::router())
}
