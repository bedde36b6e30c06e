//! Follower repository.

use std::sync::Arc;

use crate::entities::{Follower, follower};
use linkgator_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, sea_query::OnConflict,
};

/// Follower repository for database operations.
#[derive(Clone)]
pub struct FollowerRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowerRepository {
    /// Create a new follower repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a follower edge, doing nothing if the pair already exists.
    ///
    /// Returns the number of inserted rows (0 for a duplicate).
    pub async fn insert_if_absent(&self, model: follower::ActiveModel) -> AppResult<u64> {
        Follower::insert(model)
            .on_conflict(
                OnConflict::columns([
                    follower::Column::FollowerActorUri,
                    follower::Column::ActorUri,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete every edge originating from a follower.
    pub async fn delete_by_follower(&self, follower_actor_uri: &str) -> AppResult<u64> {
        Follower::delete_many()
            .filter(follower::Column::FollowerActorUri.eq(follower_actor_uri))
            .exec(self.db.as_ref())
            .await
            .map(|res| res.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Distinct follower URIs, oldest first.
    pub async fn find_follower_uris(&self) -> AppResult<Vec<String>> {
        let rows = Follower::find()
            .order_by_asc(follower::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut uris: Vec<String> = Vec::with_capacity(rows.len());
        for row in rows {
            if !uris.contains(&row.follower_actor_uri) {
                uris.push(row.follower_actor_uri);
            }
        }
        Ok(uris)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn edge(id: &str, follower_uri: &str) -> follower::Model {
        follower::Model {
            id: id.to_string(),
            follower_actor_uri: follower_uri.to_string(),
            actor_uri: "https://gator.example/users/alice".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_insert_if_absent_reports_duplicate() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = FollowerRepository::new(db);
        let model = || follower::ActiveModel {
            id: Set("f1".to_string()),
            follower_actor_uri: Set("https://remote.example/users/bob".to_string()),
            actor_uri: Set("https://gator.example/users/alice".to_string()),
            created_at: Set(Utc::now().into()),
        };

        assert_eq!(repo.insert_if_absent(model()).await.unwrap(), 1);
        assert_eq!(repo.insert_if_absent(model()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_by_follower() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let repo = FollowerRepository::new(db);
        let removed = repo
            .delete_by_follower("https://remote.example/users/bob")
            .await
            .unwrap();
        assert_eq!(removed, 2);
    }

    #[tokio::test]
    async fn test_find_follower_uris_is_distinct() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    edge("f1", "https://remote.example/users/bob"),
                    edge("f2", "https://other.example/users/carol"),
                    edge("f3", "https://remote.example/users/bob"),
                ]])
                .into_connection(),
        );

        let repo = FollowerRepository::new(db);
        let uris = repo.find_follower_uris().await.unwrap();
        assert_eq!(
            uris,
            vec![
                "https://remote.example/users/bob".to_string(),
                "https://other.example/users/carol".to_string(),
            ]
        );
    }
}
