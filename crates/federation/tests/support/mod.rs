//! Fakes shared by the federation integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use async_trait::async_trait;
use linkgator_common::metrics::FederationMetrics;
use linkgator_federation::{
    ActivityDelivery, FederationError, FederationState, RemoteActor, RemoteActorResolver,
    UrlConfig,
};
use linkgator_plugins::{
    Capability, DatabasePlugin, KeyPairRecord, MemoryDatabasePlugin, MemorySettingsStore,
    NewPost, Plugin, PluginError, PluginExecutor, PluginManifest, PluginRegistry, PostRecord,
    ProfileRecord, SettingsStore,
};
use rsa::RsaPrivateKey;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

pub const BASE: &str = "https://gator.example";
pub const ALICE: &str = "https://gator.example/users/alice";
pub const BOB: &str = "https://remote.example/users/bob";
pub const BOB_INBOX: &str = "https://remote.example/users/bob/inbox";

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

pub fn follow(object: &str) -> Value {
    json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "type": "Follow",
        "id": "https://remote.example/follows/1",
        "actor": BOB,
        "object": object,
    })
}

pub fn undo(object: Value) -> Value {
    json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "type": "Undo",
        "id": "https://remote.example/undos/1",
        "actor": BOB,
        "object": object,
    })
}

/// An activity handed to [`RecordingDelivery`].
#[derive(Debug, Clone)]
pub struct Delivered {
    pub inbox: Url,
    pub activity: Value,
    pub key_id: String,
}

/// Records deliveries instead of sending them.
#[derive(Default)]
pub struct RecordingDelivery {
    pub fail: AtomicBool,
    sent: Mutex<Vec<Delivered>>,
}

impl RecordingDelivery {
    pub fn sent(&self) -> Vec<Delivered> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActivityDelivery for RecordingDelivery {
    async fn deliver(
        &self,
        inbox: &Url,
        activity: &Value,
        _private_key: &RsaPrivateKey,
        key_id: &str,
    ) -> Result<(), FederationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(FederationError::Delivery(format!("{inbox}: refused")));
        }
        self.sent.lock().unwrap().push(Delivered {
            inbox: inbox.clone(),
            activity: activity.clone(),
            key_id: key_id.to_string(),
        });
        Ok(())
    }
}

/// Resolves every actor to `{actor}/inbox`, except on `remote.invalid`.
pub struct FakeResolver;

#[async_trait]
impl RemoteActorResolver for FakeResolver {
    async fn resolve(&self, actor: &Url) -> Result<RemoteActor, FederationError> {
        if actor.host_str() == Some("remote.invalid") {
            return Err(FederationError::ActorUnresolvable(actor.to_string()));
        }
        Ok(RemoteActor {
            id: actor.clone(),
            inbox: url(&format!("{actor}/inbox")),
            shared_inbox: None,
            preferred_username: None,
        })
    }
}

/// Memory database that records follower writes and can fail them.
pub struct InstrumentedDatabase {
    manifest: PluginManifest,
    inner: MemoryDatabasePlugin,
    pub fail_follower_writes: AtomicBool,
    added: Mutex<Vec<(String, String)>>,
    removed: Mutex<Vec<String>>,
}

impl InstrumentedDatabase {
    pub fn new() -> Self {
        Self {
            manifest: PluginManifest::new(
                "instrumented-database",
                "Instrumented Database",
                "0.1.0",
                Capability::Database,
            ),
            inner: MemoryDatabasePlugin::new(Arc::new(MemorySettingsStore::new())),
            fail_follower_writes: AtomicBool::new(false),
            added: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        }
    }

    pub fn added(&self) -> Vec<(String, String)> {
        self.added.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }

    fn check_writes(&self) -> Result<(), PluginError> {
        if self.fail_follower_writes.load(Ordering::SeqCst) {
            Err(PluginError::Backend("follower table unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Plugin for InstrumentedDatabase {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn as_database(&self) -> Option<&dyn DatabasePlugin> {
        Some(self)
    }
}

#[async_trait]
impl DatabasePlugin for InstrumentedDatabase {
    async fn get_profile_from_actor_uri(
        &self,
        actor_uri: &str,
    ) -> Result<Option<ProfileRecord>, PluginError> {
        self.inner.get_profile_from_actor_uri(actor_uri).await
    }

    async fn create_user_profile(
        &self,
        auth_id: &str,
        actor_uri: &str,
    ) -> Result<ProfileRecord, PluginError> {
        self.inner.create_user_profile(auth_id, actor_uri).await
    }

    async fn get_keys_for_actor(
        &self,
        actor_uri: &str,
    ) -> Result<Option<KeyPairRecord>, PluginError> {
        self.inner.get_keys_for_actor(actor_uri).await
    }

    async fn create_user_keys(&self, record: KeyPairRecord) -> Result<KeyPairRecord, PluginError> {
        self.inner.create_user_keys(record).await
    }

    async fn add_follower(
        &self,
        follower_actor_uri: &str,
        actor_uri: &str,
    ) -> Result<(), PluginError> {
        self.added
            .lock()
            .unwrap()
            .push((follower_actor_uri.to_string(), actor_uri.to_string()));
        self.check_writes()?;
        self.inner.add_follower(follower_actor_uri, actor_uri).await
    }

    async fn remove_follower(&self, follower_actor_uri: &str) -> Result<(), PluginError> {
        self.removed
            .lock()
            .unwrap()
            .push(follower_actor_uri.to_string());
        self.check_writes()?;
        self.inner.remove_follower(follower_actor_uri).await
    }

    async fn get_followers(&self) -> Result<Vec<String>, PluginError> {
        self.inner.get_followers().await
    }

    async fn get_all_posts(&self) -> Result<Vec<PostRecord>, PluginError> {
        self.inner.get_all_posts().await
    }

    async fn get_post_by_id(&self, id: &str) -> Result<Option<PostRecord>, PluginError> {
        self.inner.get_post_by_id(id).await
    }

    async fn create_post(&self, post: NewPost) -> Result<PostRecord, PluginError> {
        self.inner.create_post(post).await
    }
}

pub struct Harness {
    pub registry: Arc<PluginRegistry>,
    pub database: Arc<InstrumentedDatabase>,
    pub delivery: Arc<RecordingDelivery>,
    pub metrics: Arc<FederationMetrics>,
    pub state: FederationState,
}

/// Federation state over an instrumented database holding alice's profile.
pub async fn harness() -> Harness {
    let registry = Arc::new(PluginRegistry::new());
    let database = Arc::new(InstrumentedDatabase::new());
    registry.register(database.clone()).await.unwrap();
    database
        .create_user_profile("auth-alice", ALICE)
        .await
        .unwrap();

    let delivery = Arc::new(RecordingDelivery::default());
    let metrics = Arc::new(FederationMetrics::new());
    let state = FederationState::new(
        PluginExecutor::new(registry.clone()),
        UrlConfig::parse(BASE).unwrap(),
        1024,
        Arc::new(FakeResolver),
        delivery.clone(),
        metrics.clone(),
    );

    Harness {
        registry,
        database,
        delivery,
        metrics,
        state,
    }
}

pub fn memory_store() -> Arc<dyn SettingsStore> {
    Arc::new(MemorySettingsStore::new())
}
