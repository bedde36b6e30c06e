//! Account provisioning integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use linkgator_common::AppError;
use linkgator_common::metrics::FederationMetrics;
use linkgator_federation::{AccountService, KeyPairDispatcher, UrlConfig};
use linkgator_plugins::{
    DatabasePlugin, LocalAuthPlugin, MemoryDatabasePlugin, MemorySettingsStore, PluginExecutor,
    PluginRegistry,
};
use serde_json::json;
use std::sync::Arc;
use support::BASE;

struct Accounts {
    service: AccountService,
    database: Arc<MemoryDatabasePlugin>,
    registry: Arc<PluginRegistry>,
}

async fn accounts() -> Accounts {
    let store = Arc::new(
        MemorySettingsStore::new()
            .with_record(MemoryDatabasePlugin::ID, json!({ "enabled": true })),
    );
    let registry = Arc::new(PluginRegistry::new());
    let database = Arc::new(MemoryDatabasePlugin::new(store.clone()));
    registry.register(database.clone()).await.unwrap();
    registry
        .register(Arc::new(LocalAuthPlugin::new(store)))
        .await
        .unwrap();

    let executor = PluginExecutor::new(registry.clone());
    let keys = KeyPairDispatcher::new(
        executor.clone(),
        1024,
        Arc::new(FederationMetrics::new()),
    );
    let service = AccountService::new(executor, keys, UrlConfig::parse(BASE).unwrap());

    Accounts {
        service,
        database,
        registry,
    }
}

#[tokio::test]
async fn test_register_creates_profile_keys_and_session() {
    let a = accounts().await;

    let account = a
        .service
        .register("alice", "alice@gator.example", "hunter22")
        .await
        .unwrap();

    assert_eq!(account.profile.actor_uri, "https://gator.example/users/alice");
    assert_eq!(
        account.profile.auth_id.as_deref(),
        Some(account.session.user.auth_id.as_str())
    );

    let keys = a
        .database
        .get_keys_for_actor(&account.profile.actor_uri)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(keys.auth_id, account.profile.auth_id);

    let user = a.service.session(&account.session.token).await.unwrap();
    assert_eq!(user.email, "alice@gator.example");
}

#[tokio::test]
async fn test_register_rejects_taken_username_and_email() {
    let a = accounts().await;
    a.service
        .register("alice", "alice@gator.example", "hunter22")
        .await
        .unwrap();

    let taken_username = a
        .service
        .register("alice", "other@gator.example", "hunter22")
        .await
        .unwrap_err();
    assert!(matches!(taken_username, AppError::Conflict(_)));

    let taken_email = a
        .service
        .register("alice2", "alice@gator.example", "hunter22")
        .await
        .unwrap_err();
    assert!(matches!(taken_email, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_register_without_database_fails() {
    let a = accounts().await;
    assert!(a.registry.unregister(MemoryDatabasePlugin::ID));

    let err = a
        .service
        .register("alice", "alice@gator.example", "hunter22")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Plugin(_)));
}

#[tokio::test]
async fn test_sign_in_and_out() {
    let a = accounts().await;
    a.service
        .register("alice", "alice@gator.example", "hunter22")
        .await
        .unwrap();

    assert!(matches!(
        a.service.sign_in("alice@gator.example", "wrong").await,
        Err(AppError::Unauthorized)
    ));

    let session = a
        .service
        .sign_in("alice@gator.example", "hunter22")
        .await
        .unwrap();
    a.service.sign_out(&session.token).await.unwrap();

    assert!(matches!(
        a.service.session(&session.token).await,
        Err(AppError::Unauthorized)
    ));
}
