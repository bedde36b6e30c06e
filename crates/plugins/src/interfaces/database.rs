//! Database capability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PluginError;

/// A local actor known to the storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub id: String,
    pub auth_id: Option<String>,
    pub actor_uri: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted signing key pair. Both halves are JWK JSON strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPairRecord {
    pub actor_uri: String,
    pub public_key: String,
    pub private_key: String,
    pub auth_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    pub body: Option<String>,
    pub image: Option<String>,
    pub author: String,
    pub community: String,
    pub created_at: DateTime<Utc>,
    pub upvotes: i32,
    pub downvotes: i32,
    pub comments: i32,
}

/// Fields supplied when creating a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub body: Option<String>,
    pub image: Option<String>,
    pub author: String,
    pub community: String,
}

/// Storage backend for profiles, keys, followers and posts.
///
/// Lookups report "not found" as `Ok(None)` (or an empty list), never as
/// an error.
#[async_trait]
pub trait DatabasePlugin: Send + Sync {
    async fn get_profile_from_actor_uri(
        &self,
        actor_uri: &str,
    ) -> Result<Option<ProfileRecord>, PluginError>;

    async fn create_user_profile(
        &self,
        auth_id: &str,
        actor_uri: &str,
    ) -> Result<ProfileRecord, PluginError>;

    /// The active (most recently created) key pair for an actor.
    async fn get_keys_for_actor(
        &self,
        actor_uri: &str,
    ) -> Result<Option<KeyPairRecord>, PluginError>;

    async fn create_user_keys(&self, record: KeyPairRecord) -> Result<KeyPairRecord, PluginError>;

    /// Record that `follower_actor_uri` follows `actor_uri`. Adding an
    /// existing edge is a no-op.
    async fn add_follower(&self, follower_actor_uri: &str, actor_uri: &str)
    -> Result<(), PluginError>;

    /// Remove every edge originating from `follower_actor_uri`.
    async fn remove_follower(&self, follower_actor_uri: &str) -> Result<(), PluginError>;

    /// Distinct follower actor URIs.
    async fn get_followers(&self) -> Result<Vec<String>, PluginError>;

    /// All posts, newest first.
    async fn get_all_posts(&self) -> Result<Vec<PostRecord>, PluginError>;

    async fn get_post_by_id(&self, id: &str) -> Result<Option<PostRecord>, PluginError>;

    async fn create_post(&self, post: NewPost) -> Result<PostRecord, PluginError>;
}
