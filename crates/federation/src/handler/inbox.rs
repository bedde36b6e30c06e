//! Inbox handlers for receiving `ActivityPub` activities.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{debug, warn};

use super::FederationState;

/// Handle POST /users/{identifier}/inbox.
pub async fn user_inbox_handler(
    State(state): State<FederationState>,
    Path(identifier): Path<String>,
    body: Bytes,
) -> Response {
    debug!(identifier = %identifier, "Received activity in user inbox");
    receive(&state, &body).await
}

/// Handle POST /inbox.
pub async fn shared_inbox_handler(State(state): State<FederationState>, body: Bytes) -> Response {
    debug!("Received activity in shared inbox");
    receive(&state, &body).await
}

/// Parseable JSON is always answered with 202, whatever processing did.
async fn receive(state: &FederationState, body: &[u8]) -> Response {
    let activity: Value = match serde_json::from_slice(body) {
        Ok(activity) => activity,
        Err(e) => {
            warn!(error = %e, "Rejecting unparseable activity");
            return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
        }
    };

    let outcome = state.processor.process(&activity).await;
    debug!(outcome = ?outcome, "Processed inbound activity");

    StatusCode::ACCEPTED.into_response()
}
