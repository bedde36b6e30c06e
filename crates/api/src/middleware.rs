//! API state and middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use linkgator_common::metrics::FederationMetrics;
use linkgator_federation::AccountService;
use linkgator_plugins::{PluginExecutor, PluginRegistry};
use std::sync::Arc;
use tracing::debug;

use crate::extractors::Session;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<PluginRegistry>,
    pub executor: PluginExecutor,
    pub accounts: AccountService,
    pub metrics: Arc<FederationMetrics>,
}

impl AppState {
    #[must_use]
    pub fn new(
        registry: Arc<PluginRegistry>,
        accounts: AccountService,
        metrics: Arc<FederationMetrics>,
    ) -> Self {
        Self {
            executor: PluginExecutor::new(Arc::clone(&registry)),
            registry,
            accounts,
            metrics,
        }
    }
}

/// The token of an `Authorization: Bearer` header.
pub fn bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware.
///
/// Resolves a bearer token to its session; requests without a valid token
/// pass through anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&req).map(ToString::to_string) {
        match state.accounts.session(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(Session { token, user });
            }
            Err(e) => debug!(error = %e, "Ignoring invalid session token"),
        }
    }

    next.run(req).await
}
