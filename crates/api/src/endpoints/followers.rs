//! Follower listing.

use axum::{Router, extract::State, routing::get};
use linkgator_common::AppResult;
use linkgator_plugins::{Capability, require_database};
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

#[derive(Debug, Serialize)]
pub struct FollowersResponse {
    pub followers: Vec<String>,
}

/// Actor URIs of every stored follower.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<FollowersResponse>> {
    let followers = state
        .executor
        .execute_for_capability(Capability::Database, |plugin| async move {
            require_database(plugin.as_ref())?
                .get_followers()
                .await
                .map(Some)
        })
        .await
        .into_app_result()?
        .unwrap_or_default();

    Ok(ApiResponse::ok(FollowersResponse { followers }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list))
}
