//! Authentication endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use linkgator_common::AppResult;
use linkgator_federation::RegisteredAccount;
use linkgator_plugins::{AuthSession, AuthUser};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{extractors::CurrentSession, middleware::AppState, response::ApiResponse};

/// Signup request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 64), custom(function = "validate_username"))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

fn validate_username(username: &str) -> Result<(), validator::ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        Err(validator::ValidationError::new("username_charset"))
    }
}

/// Create an account: auth user, profile, actor keys, then a session.
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> AppResult<ApiResponse<RegisteredAccount>> {
    req.validate()?;

    let account = state
        .accounts
        .register(&req.username, &req.email, &req.password)
        .await?;

    Ok(ApiResponse::created(account))
}

/// Signin request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Sign in to an existing account.
async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> AppResult<ApiResponse<AuthSession>> {
    let session = state.accounts.sign_in(&req.email, &req.password).await?;
    Ok(ApiResponse::ok(session))
}

#[derive(Debug, Serialize)]
pub struct SignoutResponse {
    pub success: bool,
}

/// End the current session.
async fn signout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> AppResult<ApiResponse<SignoutResponse>> {
    state.accounts.sign_out(&session.token).await?;
    Ok(ApiResponse::ok(SignoutResponse { success: true }))
}

/// The user behind the bearer token.
async fn session(CurrentSession(session): CurrentSession) -> ApiResponse<AuthUser> {
    ApiResponse::ok(session.user)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/session", get(session))
}
