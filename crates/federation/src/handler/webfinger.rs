//! `WebFinger` handler for actor discovery.

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::FederationState;
use crate::profiles::find_profile;

/// `WebFinger` query parameters.
#[derive(Debug, Deserialize)]
pub struct WebfingerQuery {
    pub resource: String,
}

/// `WebFinger` response (JRD).
#[derive(Debug, Serialize, Deserialize)]
pub struct WebfingerResponse {
    pub subject: String,
    pub aliases: Vec<String>,
    pub links: Vec<WebfingerLink>,
}

/// `WebFinger` link.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebfingerLink {
    pub rel: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// Split `acct:user@domain` into its parts.
fn parse_acct(resource: &str) -> Option<(&str, &str)> {
    let (username, domain) = resource.strip_prefix("acct:")?.split_once('@')?;
    (!username.is_empty() && !domain.is_empty() && !domain.contains('@'))
        .then_some((username, domain))
}

/// Handle `WebFinger` requests.
///
/// Example: `/.well-known/webfinger?resource=acct:alice@gator.example`
pub async fn webfinger_handler(
    State(state): State<FederationState>,
    Query(query): Query<WebfingerQuery>,
) -> Response {
    info!(resource = %query.resource, "WebFinger lookup");

    let Some((username, domain)) = parse_acct(&query.resource) else {
        return (StatusCode::BAD_REQUEST, "Invalid resource format").into_response();
    };

    if !domain.eq_ignore_ascii_case(&state.urls.domain()) {
        return (StatusCode::NOT_FOUND, "Unknown domain").into_response();
    }

    let actor_url = state.urls.actor_url(username);
    match find_profile(&state.executor, actor_url.as_str()).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            info!(username = %username, "User not found for WebFinger");
            return (StatusCode::NOT_FOUND, "User not found").into_response();
        }
        Err(e) => {
            warn!(error = %e, "Profile lookup failed during WebFinger");
            return (StatusCode::NOT_FOUND, "User not found").into_response();
        }
    }

    let response = WebfingerResponse {
        subject: query.resource.clone(),
        aliases: vec![actor_url.to_string()],
        links: vec![WebfingerLink {
            rel: "self".to_string(),
            link_type: Some("application/activity+json".to_string()),
            href: Some(actor_url.to_string()),
        }],
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/jrd+json; charset=utf-8")],
        Json(response),
    )
        .into_response()
}
