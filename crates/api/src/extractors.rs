//! Request extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use linkgator_plugins::AuthUser;

/// A request's authenticated session, set by the auth middleware.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: AuthUser,
}

/// Authenticated session extractor.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(CurrentSession)
            .ok_or((StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}
