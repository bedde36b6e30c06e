//! Account provisioning.
//!
//! Registration spans both capabilities: the auth backend owns
//! credentials, the database backend owns the profile and the actor's
//! key pair.

use linkgator_common::{AppError, AppResult};
use linkgator_plugins::{
    AuthSession, AuthUser, Capability, CapabilityExecutionError, PluginExecutor, ProfileRecord,
    require_auth, require_database,
};
use serde::Serialize;
use tracing::{error, info};

use crate::keys::KeyPairDispatcher;
use crate::profiles::find_profile;
use crate::urls::UrlConfig;

/// A freshly registered and signed-in account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredAccount {
    pub profile: ProfileRecord,
    pub session: AuthSession,
}

/// Registers accounts and manages their sessions.
#[derive(Debug, Clone)]
pub struct AccountService {
    executor: PluginExecutor,
    keys: KeyPairDispatcher,
    urls: UrlConfig,
}

fn joined(errors: &[CapabilityExecutionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl AccountService {
    #[must_use]
    pub const fn new(executor: PluginExecutor, keys: KeyPairDispatcher, urls: UrlConfig) -> Self {
        Self {
            executor,
            keys,
            urls,
        }
    }

    /// Register `username` and sign it in.
    ///
    /// Steps: auth sign-up, profile creation, key provisioning, sign-in.
    /// The first failing step aborts registration; earlier steps are not
    /// undone.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AppResult<RegisteredAccount> {
        let actor_uri = self.urls.actor_url(username).to_string();

        self.ensure_enabled(Capability::Auth)?;
        self.ensure_enabled(Capability::Database)?;

        if find_profile(&self.executor, &actor_uri).await?.is_some() {
            return Err(AppError::Conflict(format!("username {username} is taken")));
        }

        let user = self
            .executor
            .execute_for_capability(Capability::Auth, |plugin| async move {
                require_auth(plugin.as_ref())?
                    .sign_up_user(email, password)
                    .await
            })
            .await
            .into_result()
            .map_err(|errors| {
                error!(username = %username, errors = %joined(&errors), "Sign-up failed");
                AppError::Plugin(joined(&errors))
            })?
            .ok_or_else(|| AppError::Conflict("email is already registered".to_string()))?;

        let profile = self
            .executor
            .execute_for_capability(Capability::Database, |plugin| {
                let auth_id = user.auth_id.clone();
                let actor_uri = actor_uri.clone();
                async move {
                    require_database(plugin.as_ref())?
                        .create_user_profile(&auth_id, &actor_uri)
                        .await
                        .map(Some)
                }
            })
            .await
            .into_result()
            .map_err(|errors| {
                error!(username = %username, errors = %joined(&errors), "Couldn't create profile");
                AppError::Plugin(joined(&errors))
            })?
            .ok_or_else(|| AppError::Plugin("no database plugin is enabled".to_string()))?;

        self.keys
            .provision(&actor_uri, Some(&user.auth_id))
            .await
            .map_err(|e| {
                error!(username = %username, error = %e, "Couldn't create keys");
                AppError::from(e)
            })?;

        let session = self.sign_in(email, password).await?;

        info!(username = %username, actor = %actor_uri, "Registered account");

        Ok(RegisteredAccount { profile, session })
    }

    fn ensure_enabled(&self, capability: Capability) -> AppResult<()> {
        let enabled = self
            .executor
            .registry()
            .get_by_capability(capability)
            .iter()
            .any(|plugin| plugin.is_enabled());
        if enabled {
            Ok(())
        } else {
            Err(AppError::Plugin(format!("no enabled {capability} plugin")))
        }
    }

    /// Start a session. `Unauthorized` on bad credentials.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        self.executor
            .execute_for_capability(Capability::Auth, |plugin| async move {
                require_auth(plugin.as_ref())?
                    .sign_in_user(email, password)
                    .await
            })
            .await
            .into_app_result()?
            .ok_or(AppError::Unauthorized)
    }

    /// End a session. Unknown tokens are not an error.
    pub async fn sign_out(&self, token: &str) -> AppResult<()> {
        self.executor
            .execute_for_capability(Capability::Auth, |plugin| async move {
                require_auth(plugin.as_ref())?
                    .log_out_user(token)
                    .await
                    .map(Some)
            })
            .await
            .into_app_result()
            .map(|_| ())
    }

    /// The user behind a session token. `Unauthorized` if there is none.
    pub async fn session(&self, token: &str) -> AppResult<AuthUser> {
        self.executor
            .execute_for_capability(Capability::Auth, |plugin| async move {
                require_auth(plugin.as_ref())?
                    .check_if_logged_in(token)
                    .await
            })
            .await
            .into_app_result()?
            .ok_or(AppError::Unauthorized)
    }
}
