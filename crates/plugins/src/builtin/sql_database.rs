//! Relational database backend on top of `linkgator-db`.

use async_trait::async_trait;
use chrono::Utc;
use linkgator_common::IdGenerator;
use linkgator_db::entities::{actor_key, follower, post, profile};
use linkgator_db::repositories::{
    ActorKeyRepository, FollowerRepository, PostRepository, ProfileRepository,
};
use sea_orm::{DatabaseConnection, Set};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::capability::Capability;
use crate::error::PluginError;
use crate::interfaces::{DatabasePlugin, KeyPairRecord, NewPost, PostRecord, ProfileRecord};
use crate::plugin::{Plugin, PluginManifest};
use crate::settings::{PluginSettings, SettingsStore};

/// Database backend storing everything in `PostgreSQL`. Enabled by default.
pub struct SqlDatabasePlugin {
    manifest: PluginManifest,
    settings: PluginSettings,
    profiles: ProfileRepository,
    keys: ActorKeyRepository,
    followers: FollowerRepository,
    posts: PostRepository,
    ids: IdGenerator,
}

impl SqlDatabasePlugin {
    pub const ID: &'static str = "sql-database";

    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, store: Arc<dyn SettingsStore>) -> Self {
        Self {
            manifest: PluginManifest::new(Self::ID, "SQL Database", "1.0.0", Capability::Database)
                .with_description("Stores profiles, keys, followers and posts in PostgreSQL"),
            settings: PluginSettings::new(Self::ID, json!({ "enabled": true }), store),
            profiles: ProfileRepository::new(Arc::clone(&db)),
            keys: ActorKeyRepository::new(Arc::clone(&db)),
            followers: FollowerRepository::new(Arc::clone(&db)),
            posts: PostRepository::new(db),
            ids: IdGenerator::new(),
        }
    }
}

impl Plugin for SqlDatabasePlugin {
    fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn settings(&self) -> Option<&PluginSettings> {
        Some(&self.settings)
    }

    fn as_database(&self) -> Option<&dyn DatabasePlugin> {
        Some(self)
    }
}

fn profile_record(model: profile::Model) -> ProfileRecord {
    ProfileRecord {
        id: model.id,
        auth_id: model.auth_id,
        actor_uri: model.actor_uri,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn key_record(model: actor_key::Model) -> KeyPairRecord {
    KeyPairRecord {
        actor_uri: model.actor_uri,
        public_key: model.public_key,
        private_key: model.private_key,
        auth_id: model.auth_id,
    }
}

fn post_record(model: post::Model) -> PostRecord {
    PostRecord {
        id: model.id,
        title: model.title,
        body: model.body,
        image: model.image,
        author: model.author,
        community: model.community,
        created_at: model.created_at.with_timezone(&Utc),
        upvotes: model.upvotes,
        downvotes: model.downvotes,
        comments: model.comments,
    }
}

#[async_trait]
impl DatabasePlugin for SqlDatabasePlugin {
    async fn get_profile_from_actor_uri(
        &self,
        actor_uri: &str,
    ) -> Result<Option<ProfileRecord>, PluginError> {
        Ok(self
            .profiles
            .find_by_actor_uri(actor_uri)
            .await?
            .map(profile_record))
    }

    async fn create_user_profile(
        &self,
        auth_id: &str,
        actor_uri: &str,
    ) -> Result<ProfileRecord, PluginError> {
        let model = profile::ActiveModel {
            id: Set(self.ids.generate()),
            auth_id: Set(Some(auth_id.to_string())),
            actor_uri: Set(actor_uri.to_string()),
            created_at: Set(Utc::now().into()),
        };
        Ok(profile_record(self.profiles.create(model).await?))
    }

    async fn get_keys_for_actor(
        &self,
        actor_uri: &str,
    ) -> Result<Option<KeyPairRecord>, PluginError> {
        Ok(self
            .keys
            .find_latest_by_actor_uri(actor_uri)
            .await?
            .map(key_record))
    }

    async fn create_user_keys(&self, record: KeyPairRecord) -> Result<KeyPairRecord, PluginError> {
        let model = actor_key::ActiveModel {
            id: Set(self.ids.generate()),
            auth_id: Set(record.auth_id),
            actor_uri: Set(record.actor_uri),
            public_key: Set(record.public_key),
            private_key: Set(record.private_key),
            created_at: Set(Utc::now().into()),
        };
        Ok(key_record(self.keys.create(model).await?))
    }

    async fn add_follower(
        &self,
        follower_actor_uri: &str,
        actor_uri: &str,
    ) -> Result<(), PluginError> {
        let model = follower::ActiveModel {
            id: Set(self.ids.generate()),
            follower_actor_uri: Set(follower_actor_uri.to_string()),
            actor_uri: Set(actor_uri.to_string()),
            created_at: Set(Utc::now().into()),
        };

        if self.followers.insert_if_absent(model).await? == 0 {
            debug!(follower = %follower_actor_uri, actor = %actor_uri, "Follower already recorded");
        }
        Ok(())
    }

    async fn remove_follower(&self, follower_actor_uri: &str) -> Result<(), PluginError> {
        let removed = self.followers.delete_by_follower(follower_actor_uri).await?;
        debug!(follower = %follower_actor_uri, removed, "Removed follower edges");
        Ok(())
    }

    async fn get_followers(&self) -> Result<Vec<String>, PluginError> {
        Ok(self.followers.find_follower_uris().await?)
    }

    async fn get_all_posts(&self) -> Result<Vec<PostRecord>, PluginError> {
        Ok(self
            .posts
            .find_all()
            .await?
            .into_iter()
            .map(post_record)
            .collect())
    }

    async fn get_post_by_id(&self, id: &str) -> Result<Option<PostRecord>, PluginError> {
        Ok(self.posts.find_by_id(id).await?.map(post_record))
    }

    async fn create_post(&self, post: NewPost) -> Result<PostRecord, PluginError> {
        let model = post::ActiveModel {
            id: Set(self.ids.generate()),
            title: Set(post.title),
            body: Set(post.body),
            image: Set(post.image),
            author: Set(post.author),
            community: Set(post.community),
            upvotes: Set(0),
            downvotes: Set(0),
            comments: Set(0),
            created_at: Set(Utc::now().into()),
        };
        Ok(post_record(self.posts.create(model).await?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::settings::MemorySettingsStore;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn plugin(db: DatabaseConnection) -> SqlDatabasePlugin {
        SqlDatabasePlugin::new(Arc::new(db), Arc::new(MemorySettingsStore::new()))
    }

    #[tokio::test]
    async fn test_enabled_by_default() {
        let plugin = plugin(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        plugin.load_settings().await.unwrap();
        assert!(plugin.is_enabled());
    }

    #[tokio::test]
    async fn test_get_keys_maps_latest_row() {
        let row = actor_key::Model {
            id: "k1".to_string(),
            auth_id: Some("auth1".to_string()),
            actor_uri: "https://gator.example/users/alice".to_string(),
            public_key: "{}".to_string(),
            private_key: "{}".to_string(),
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[row]])
            .into_connection();

        let found = plugin(db)
            .get_keys_for_actor("https://gator.example/users/alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.auth_id.as_deref(), Some("auth1"));
    }

    #[tokio::test]
    async fn test_duplicate_follower_is_not_an_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        plugin(db)
            .add_follower("https://remote.example/users/bob", "https://gator.example/users/alice")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_database_error_becomes_backend_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([sea_orm::DbErr::Custom("connection refused".to_string())])
            .into_connection();

        let err = plugin(db).get_followers().await.unwrap_err();
        assert!(matches!(err, PluginError::Backend(_)));
    }
}
