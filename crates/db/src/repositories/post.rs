//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use linkgator_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All posts, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<post::Model>> {
        Post::find()
            .order_by_desc(post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
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

    fn post(id: &str, title: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            title: title.to_string(),
            body: None,
            image: None,
            author: "alice".to_string(),
            community: "rust".to_string(),
            upvotes: 3,
            downvotes: 0,
            comments: 1,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post("post1", "Hello")]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let found = repo.find_by_id("post1").await.unwrap().unwrap();
        assert_eq!(found.title, "Hello");
    }

    #[tokio::test]
    async fn test_find_all() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post("post2", "Newer"), post("post1", "Older")]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let posts = repo.find_all().await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "post2");
    }
}
