//! Auth capability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::PluginError;

/// An account known to the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub auth_id: String,
    pub email: String,
}

/// A signed-in session. The token is opaque to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user: AuthUser,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait AuthPlugin: Send + Sync {
    /// Create an account. `Ok(None)` if the email is already registered.
    async fn sign_up_user(&self, email: &str, password: &str)
    -> Result<Option<AuthUser>, PluginError>;

    /// `Ok(None)` on bad credentials.
    async fn sign_in_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthSession>, PluginError>;

    /// End a session. Unknown tokens are ignored.
    async fn log_out_user(&self, token: &str) -> Result<(), PluginError>;

    /// The session's user, or `None` if the token is unknown or expired.
    async fn check_if_logged_in(&self, token: &str) -> Result<Option<AuthUser>, PluginError>;
}
