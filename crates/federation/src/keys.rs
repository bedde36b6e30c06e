//! Key-pair dispatcher.
//!
//! Every local actor signs with an RSA key pair held by the database
//! capability. Pairs are created lazily the first time an actor needs one
//! and are never rotated.

use linkgator_common::crypto::{RsaJwk, generate_rsa_keypair, public_key_pem};
use linkgator_common::metrics::FederationMetrics;
use linkgator_plugins::{
    Capability, KeyPairRecord, PluginExecutor, require_database,
};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::FederationError;

/// A decoded signing key pair.
#[derive(Debug, Clone)]
pub struct ActorKeyPair {
    pub private_key: RsaPrivateKey,
    pub public_key: RsaPublicKey,
}

impl ActorKeyPair {
    /// Decode a stored record. Both halves must parse.
    pub fn from_record(record: &KeyPairRecord) -> Result<Self, FederationError> {
        let private_key = RsaJwk::from_json(&record.private_key)
            .and_then(|jwk| jwk.to_private_key())
            .map_err(|e| FederationError::KeyMaterialInvalid(format!("private key: {e}")))?;
        let public_key = RsaJwk::from_json(&record.public_key)
            .and_then(|jwk| jwk.to_public_key())
            .map_err(|e| FederationError::KeyMaterialInvalid(format!("public key: {e}")))?;

        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Public key in SPKI PEM, as published in actor documents.
    pub fn public_key_pem(&self) -> Result<String, FederationError> {
        public_key_pem(&self.public_key)
            .map_err(|e| FederationError::KeyMaterialInvalid(e.to_string()))
    }
}

/// Resolves the signing key pairs of local actors.
#[derive(Debug, Clone)]
pub struct KeyPairDispatcher {
    executor: PluginExecutor,
    key_bits: usize,
    metrics: Arc<FederationMetrics>,
}

impl KeyPairDispatcher {
    #[must_use]
    pub const fn new(
        executor: PluginExecutor,
        key_bits: usize,
        metrics: Arc<FederationMetrics>,
    ) -> Self {
        Self {
            executor,
            key_bits,
            metrics,
        }
    }

    /// Key pairs of `actor_uri`, creating one on first use.
    ///
    /// Returns an empty list when the stored material is unusable or a new
    /// pair could not be persisted.
    pub async fn dispatch(&self, actor_uri: &str) -> Vec<ActorKeyPair> {
        let outcome = self
            .executor
            .execute_for_capability(Capability::Database, |plugin| {
                let actor_uri = actor_uri.to_string();
                async move {
                    require_database(plugin.as_ref())?
                        .get_keys_for_actor(&actor_uri)
                        .await
                }
            })
            .await;

        let record = match outcome.into_result() {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(actor = %actor_uri, "No stored key pair, generating one");
                return self.provision_or_empty(actor_uri).await;
            }
            Err(errors) => {
                warn!(
                    actor = %actor_uri,
                    errors = errors.len(),
                    "Key lookup failed, generating a new key pair"
                );
                return self.provision_or_empty(actor_uri).await;
            }
        };

        match ActorKeyPair::from_record(&record) {
            Ok(pair) => vec![pair],
            Err(e) => {
                warn!(actor = %actor_uri, error = %e, "Stored key pair is unusable");
                Vec::new()
            }
        }
    }

    async fn provision_or_empty(&self, actor_uri: &str) -> Vec<ActorKeyPair> {
        match self.provision(actor_uri, None).await {
            Ok(pair) => vec![pair],
            Err(e) => {
                warn!(actor = %actor_uri, error = %e, "Failed to provision key pair");
                Vec::new()
            }
        }
    }

    /// Generate a key pair for `actor_uri` and persist it.
    ///
    /// The pair is only returned once at least one database plugin has
    /// stored it.
    pub async fn provision(
        &self,
        actor_uri: &str,
        auth_id: Option<&str>,
    ) -> Result<ActorKeyPair, FederationError> {
        let bits = self.key_bits;
        let keypair = tokio::task::spawn_blocking(move || generate_rsa_keypair(bits))
            .await
            .map_err(|e| FederationError::KeyMaterialInvalid(e.to_string()))?
            .map_err(|e| FederationError::KeyMaterialInvalid(e.to_string()))?;

        let (public_jwk, private_jwk) = keypair.to_jwks();
        let record = KeyPairRecord {
            actor_uri: actor_uri.to_string(),
            public_key: public_jwk
                .to_json()
                .map_err(|e| FederationError::KeyMaterialInvalid(e.to_string()))?,
            private_key: private_jwk
                .to_json()
                .map_err(|e| FederationError::KeyMaterialInvalid(e.to_string()))?,
            auth_id: auth_id.map(ToString::to_string),
        };

        let outcome = self
            .executor
            .execute_for_capability(Capability::Database, |plugin| {
                let record = record.clone();
                async move {
                    require_database(plugin.as_ref())?
                        .create_user_keys(record)
                        .await
                        .map(Some)
                }
            })
            .await;

        match outcome.into_result() {
            Ok(Some(_)) => {
                FederationMetrics::incr(&self.metrics.keys_provisioned);
                info!(actor = %actor_uri, bits = bits, "Provisioned actor key pair");
                Ok(ActorKeyPair {
                    private_key: keypair.private_key,
                    public_key: keypair.public_key,
                })
            }
            Ok(None) => Err(FederationError::Storage(
                "no database plugin stored the key pair".to_string(),
            )),
            Err(errors) => Err(FederationError::Storage(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use linkgator_plugins::{
        DatabasePlugin, MemoryDatabasePlugin, MemorySettingsStore, PluginRegistry,
    };
    use serde_json::json;

    const ACTOR: &str = "https://gator.example/users/alice";

    async fn setup() -> (KeyPairDispatcher, Arc<MemoryDatabasePlugin>, Arc<FederationMetrics>) {
        let store = Arc::new(
            MemorySettingsStore::new()
                .with_record(MemoryDatabasePlugin::ID, json!({ "enabled": true })),
        );
        let database = Arc::new(MemoryDatabasePlugin::new(store));
        let registry = Arc::new(PluginRegistry::new());
        registry.register(database.clone()).await.unwrap();

        let metrics = Arc::new(FederationMetrics::new());
        let dispatcher =
            KeyPairDispatcher::new(PluginExecutor::new(registry), 1024, metrics.clone());
        (dispatcher, database, metrics)
    }

    #[tokio::test]
    async fn test_dispatch_is_idempotent() {
        let (dispatcher, database, metrics) = setup().await;

        let first = dispatcher.dispatch(ACTOR).await;
        let second = dispatcher.dispatch(ACTOR).await;

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(first[0].public_key, second[0].public_key);
        assert!(database.get_keys_for_actor(ACTOR).await.unwrap().is_some());
        assert_eq!(metrics.snapshot().keys_provisioned, 1);
    }

    #[tokio::test]
    async fn test_invalid_jwk_yields_no_pairs() {
        let (dispatcher, database, metrics) = setup().await;
        database
            .create_user_keys(KeyPairRecord {
                actor_uri: ACTOR.to_string(),
                public_key: "{not json".to_string(),
                private_key: "{not json".to_string(),
                auth_id: None,
            })
            .await
            .unwrap();

        assert!(dispatcher.dispatch(ACTOR).await.is_empty());
        assert_eq!(metrics.snapshot().keys_provisioned, 0);
    }

    #[tokio::test]
    async fn test_no_database_yields_no_pairs() {
        let dispatcher = KeyPairDispatcher::new(
            PluginExecutor::new(Arc::new(PluginRegistry::new())),
            1024,
            Arc::new(FederationMetrics::new()),
        );

        assert!(dispatcher.dispatch(ACTOR).await.is_empty());
        assert!(matches!(
            dispatcher.provision(ACTOR, None).await,
            Err(FederationError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_provision_records_auth_id() {
        let (dispatcher, database, _) = setup().await;

        let pair = dispatcher.provision(ACTOR, Some("auth-1")).await.unwrap();
        let stored = database.get_keys_for_actor(ACTOR).await.unwrap().unwrap();

        assert_eq!(stored.auth_id.as_deref(), Some("auth-1"));
        assert_eq!(
            ActorKeyPair::from_record(&stored).unwrap().public_key,
            pair.public_key
        );
        assert!(pair.public_key_pem().unwrap().contains("PUBLIC KEY"));
    }
}
