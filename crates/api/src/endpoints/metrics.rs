//! Federation counters.

use axum::{Router, extract::State, routing::get};
use linkgator_common::MetricsSnapshot;

use crate::{middleware::AppState, response::ApiResponse};

async fn snapshot(State(state): State<AppState>) -> ApiResponse<MetricsSnapshot> {
    ApiResponse::ok(state.metrics.snapshot())
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(snapshot))
}
