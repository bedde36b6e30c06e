//! `ActivityPub` actor (Person) endpoint handler.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use super::FederationState;
use crate::actors::{ApPerson, ApPublicKey};
use crate::profiles::find_profile;
use crate::urls::UrlConfig;

const ACTIVITY_MEDIA_TYPES: [&str; 2] = ["application/activity+json", "application/ld+json"];

fn accepts_activity_json(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| {
            ACTIVITY_MEDIA_TYPES
                .iter()
                .any(|media_type| value.contains(media_type))
        })
}

/// Handle GET /users/{identifier}.
///
/// Only `ActivityPub` clients are served; anything else gets
/// `406 Not Acceptable`.
pub async fn actor_handler(
    State(state): State<FederationState>,
    Path(identifier): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !accepts_activity_json(&headers) {
        return (
            StatusCode::NOT_ACCEPTABLE,
            [
                (header::CONTENT_TYPE, "text/plain"),
                (header::VARY, "Accept"),
            ],
            "Not Acceptable",
        )
            .into_response();
    }

    info!(identifier = %identifier, "ActivityPub actor lookup");

    let actor_url = state.urls.actor_url(&identifier);
    match find_profile(&state.executor, actor_url.as_str()).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            info!(identifier = %identifier, "Actor not found");
            return (StatusCode::NOT_FOUND, "Actor not found").into_response();
        }
        Err(e) => {
            warn!(identifier = %identifier, error = %e, "Actor lookup failed");
            return (StatusCode::NOT_FOUND, "Actor not found").into_response();
        }
    }

    let keys: Vec<ApPublicKey> = state
        .keys
        .dispatch(actor_url.as_str())
        .await
        .iter()
        .enumerate()
        .filter_map(|(index, pair)| match pair.public_key_pem() {
            Ok(public_key_pem) => Some(ApPublicKey {
                id: UrlConfig::key_id_at(&actor_url, index),
                owner: actor_url.clone(),
                public_key_pem,
            }),
            Err(e) => {
                warn!(identifier = %identifier, error = %e, "Skipping unencodable key");
                None
            }
        })
        .collect();

    let person = ApPerson::new(
        actor_url.clone(),
        identifier.clone(),
        state.urls.base_url().clone(),
        state.urls.inbox_url(&identifier),
        state.urls.shared_inbox_url(),
    )
    .with_keys(keys);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/activity+json; charset=utf-8")],
        Json(person),
    )
        .into_response()
}
