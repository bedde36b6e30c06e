//! In-process authentication backend.
//!
//! Accounts are kept in memory with Argon2 password hashes. Sessions are
//! opaque random tokens with a configurable lifetime.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use linkgator_common::IdGenerator;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use crate::capability::Capability;
use crate::error::PluginError;
use crate::interfaces::{AuthPlugin, AuthSession, AuthUser};
use crate::plugin::{Plugin, PluginManifest};
use crate::settings::{PluginSettings, SettingsStore};

const DEFAULT_SESSION_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;
const MAX_SESSION_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone)]
struct Account {
    auth_id: String,
    email: String,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct Session {
    auth_id: String,
    email: String,
    expires_at: DateTime<Utc>,
}

/// Email/password authentication. Enabled by default.
pub struct LocalAuthPlugin {
    manifest: PluginManifest,
    settings: PluginSettings,
    /// Keyed by normalized email
    accounts: RwLock<HashMap<String, Account>>,
    /// Keyed by token
    sessions: RwLock<HashMap<String, Session>>,
    ids: IdGenerator,
}

impl LocalAuthPlugin {
    pub const ID: &'static str = "local-auth";

    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            manifest: PluginManifest::new(Self::ID, "Local Auth", "1.0.0", Capability::Auth)
                .with_description("Email and password accounts with Argon2 hashes"),
            settings: PluginSettings::new(
                Self::ID,
                json!({
                    "enabled": true,
                    "sessionTtlSeconds": DEFAULT_SESSION_TTL_SECONDS,
                }),
                store,
            ),
            accounts: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            ids: IdGenerator::new(),
        }
    }

    fn session_ttl(&self) -> Duration {
        let seconds = self
            .settings
            .get_u64("sessionTtlSeconds")
            .unwrap_or(DEFAULT_SESSION_TTL_SECONDS)
            .min(MAX_SESSION_TTL_SECONDS);
        Duration::seconds(i64::try_from(seconds).unwrap_or_default())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> Result<String, PluginError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PluginError::Backend(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<bool, PluginError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PluginError::Backend(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

impl Plugin for LocalAuthPlugin {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn settings(&self) -> Option<&PluginSettings> {
        Some(&self.settings)
    }

    fn as_auth(&self) -> Option<&dyn AuthPlugin> {
        Some(self)
    }
}

#[async_trait]
impl AuthPlugin for LocalAuthPlugin {
    async fn sign_up_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthUser>, PluginError> {
        let key = normalize_email(email);
        let password_hash = hash_password(password)?;

        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if accounts.contains_key(&key) {
            debug!(email = %key, "Email already registered");
            return Ok(None);
        }

        let account = Account {
            auth_id: self.ids.generate(),
            email: key.clone(),
            password_hash,
        };
        let user = AuthUser {
            auth_id: account.auth_id.clone(),
            email: account.email.clone(),
        };
        accounts.insert(key, account);
        drop(accounts);

        info!(auth_id = %user.auth_id, "Account created");
        Ok(Some(user))
    }

    async fn sign_in_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthSession>, PluginError> {
        let key = normalize_email(email);
        let account = self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();

        let Some(account) = account else {
            return Ok(None);
        };
        if !verify_password(password, &account.password_hash)? {
            debug!(auth_id = %account.auth_id, "Password mismatch");
            return Ok(None);
        }

        let token = self.ids.generate_token();
        let expires_at = Utc::now() + self.session_ttl();
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                token.clone(),
                Session {
                    auth_id: account.auth_id.clone(),
                    email: account.email.clone(),
                    expires_at,
                },
            );

        Ok(Some(AuthSession {
            token,
            user: AuthUser {
                auth_id: account.auth_id,
                email: account.email,
            },
            expires_at,
        }))
    }

    async fn log_out_user(&self, token: &str) -> Result<(), PluginError> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token);
        Ok(())
    }

    async fn check_if_logged_in(&self, token: &str) -> Result<Option<AuthUser>, PluginError> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        match sessions.get(token) {
            Some(session) if session.expires_at > Utc::now() => Ok(Some(AuthUser {
                auth_id: session.auth_id.clone(),
                email: session.email.clone(),
            })),
            Some(_) => {
                sessions.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
