//! Actor key repository.

use std::sync::Arc;

use crate::entities::{ActorKey, actor_key};
use linkgator_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Actor key repository for database operations.
#[derive(Clone)]
pub struct ActorKeyRepository {
    db: Arc<DatabaseConnection>,
}

impl ActorKeyRepository {
    /// Create a new actor key repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the active (most recently created) key pair for an actor.
    pub async fn find_latest_by_actor_uri(
        &self,
        actor_uri: &str,
    ) -> AppResult<Option<actor_key::Model>> {
        ActorKey::find()
            .filter(actor_key::Column::ActorUri.eq(actor_uri))
            .order_by_desc(actor_key::Column::CreatedAt)
            .order_by_desc(actor_key::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a key pair.
    pub async fn create(&self, model: actor_key::ActiveModel) -> AppResult<actor_key::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_find_latest_by_actor_uri() {
        let key = actor_key::Model {
            id: "k2".to_string(),
            auth_id: None,
            actor_uri: "https://gator.example/users/alice".to_string(),
            public_key: r#"{"kty":"RSA","n":"AQAB","e":"AQAB"}"#.to_string(),
            private_key: r#"{"kty":"RSA","n":"AQAB","e":"AQAB","d":"AQAB"}"#.to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[key.clone()]])
                .into_connection(),
        );

        let repo = ActorKeyRepository::new(db);
        let found = repo
            .find_latest_by_actor_uri("https://gator.example/users/alice")
            .await
            .unwrap();
        assert_eq!(found, Some(key));
    }
}
