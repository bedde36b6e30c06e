//! In-process database backend.

use async_trait::async_trait;
use chrono::Utc;
use linkgator_common::IdGenerator;
use serde_json::json;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use crate::capability::Capability;
use crate::error::PluginError;
use crate::interfaces::{DatabasePlugin, KeyPairRecord, NewPost, PostRecord, ProfileRecord};
use crate::plugin::{Plugin, PluginManifest};
use crate::settings::{PluginSettings, SettingsStore};

#[derive(Debug, Default)]
struct MemoryState {
    profiles: Vec<ProfileRecord>,
    keys: Vec<KeyPairRecord>,
    /// (follower, followed)
    followers: Vec<(String, String)>,
    posts: Vec<PostRecord>,
}

/// Database backend holding everything in memory. Disabled by default.
pub struct MemoryDatabasePlugin {
    manifest: PluginManifest,
    settings: PluginSettings,
    state: RwLock<MemoryState>,
    ids: IdGenerator,
}

impl MemoryDatabasePlugin {
    pub const ID: &'static str = "memory-database";

    #[must_use]
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            manifest: PluginManifest::new(Self::ID, "Memory Database", "1.0.0", Capability::Database)
                .with_description("Keeps profiles, keys, followers and posts in process memory"),
            settings: PluginSettings::new(Self::ID, json!({ "enabled": false }), store),
            state: RwLock::new(MemoryState::default()),
            ids: IdGenerator::new(),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&MemoryState) -> T) -> T {
        f(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn write<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> T {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Plugin for MemoryDatabasePlugin {
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

#[async_trait]
impl DatabasePlugin for MemoryDatabasePlugin {
    async fn get_profile_from_actor_uri(
        &self,
        actor_uri: &str,
    ) -> Result<Option<ProfileRecord>, PluginError> {
        Ok(self.read(|s| s.profiles.iter().find(|p| p.actor_uri == actor_uri).cloned()))
    }

    async fn create_user_profile(
        &self,
        auth_id: &str,
        actor_uri: &str,
    ) -> Result<ProfileRecord, PluginError> {
        let profile = ProfileRecord {
            id: self.ids.generate(),
            auth_id: Some(auth_id.to_string()),
            actor_uri: actor_uri.to_string(),
            created_at: Utc::now(),
        };

        self.write(|s| {
            if s.profiles.iter().any(|p| p.actor_uri == actor_uri) {
                return Err(PluginError::Backend(format!(
                    "profile for {actor_uri} already exists"
                )));
            }
            s.profiles.push(profile.clone());
            Ok(())
        })?;

        Ok(profile)
    }

    async fn get_keys_for_actor(
        &self,
        actor_uri: &str,
    ) -> Result<Option<KeyPairRecord>, PluginError> {
        Ok(self.read(|s| {
            s.keys
                .iter()
                .rev()
                .find(|k| k.actor_uri == actor_uri)
                .cloned()
        }))
    }

    async fn create_user_keys(&self, record: KeyPairRecord) -> Result<KeyPairRecord, PluginError> {
        self.write(|s| s.keys.push(record.clone()));
        Ok(record)
    }

    async fn add_follower(
        &self,
        follower_actor_uri: &str,
        actor_uri: &str,
    ) -> Result<(), PluginError> {
        let inserted = self.write(|s| {
            let exists = s
                .followers
                .iter()
                .any(|(f, a)| f == follower_actor_uri && a == actor_uri);
            if !exists {
                s.followers
                    .push((follower_actor_uri.to_string(), actor_uri.to_string()));
            }
            !exists
        });

        if !inserted {
            debug!(follower = %follower_actor_uri, actor = %actor_uri, "Follower already recorded");
        }
        Ok(())
    }

    async fn remove_follower(&self, follower_actor_uri: &str) -> Result<(), PluginError> {
        self.write(|s| s.followers.retain(|(f, _)| f != follower_actor_uri));
        Ok(())
    }

    async fn get_followers(&self) -> Result<Vec<String>, PluginError> {
        Ok(self.read(|s| {
            let mut uris: Vec<String> = Vec::new();
            for (follower, _) in &s.followers {
                if !uris.contains(follower) {
                    uris.push(follower.clone());
                }
            }
            uris
        }))
    }

    async fn get_all_posts(&self) -> Result<Vec<PostRecord>, PluginError> {
        Ok(self.read(|s| {
            let mut posts = s.posts.clone();
            posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            posts
        }))
    }

    async fn get_post_by_id(&self, id: &str) -> Result<Option<PostRecord>, PluginError> {
        Ok(self.read(|s| s.posts.iter().find(|p| p.id == id).cloned()))
    }

    async fn create_post(&self, post: NewPost) -> Result<PostRecord, PluginError> {
        let record = PostRecord {
            id: self.ids.generate(),
            title: post.title,
            body: post.body,
            image: post.image,
            author: post.author,
            community: post.community,
            created_at: Utc::now(),
            upvotes: 0,
            downvotes: 0,
            comments: 0,
        };
        self.write(|s| s.posts.push(record.clone()));
        Ok(record)
    }
}
