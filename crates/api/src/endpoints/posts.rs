//! Post endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use linkgator_common::{AppError, AppResult};
use linkgator_plugins::{Capability, NewPost, PostRecord, require_database};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{middleware::AppState, response::ApiResponse};

#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub posts: Vec<PostRecord>,
}

/// Create-post request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,

    #[validate(length(max = 40000))]
    pub body: Option<String>,

    #[validate(url)]
    pub image: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub author: String,

    #[validate(length(min = 1, max = 128))]
    pub community: String,
}

/// All posts known to the database backend.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<PostsResponse>> {
    let posts = state
        .executor
        .execute_for_capability(Capability::Database, |plugin| async move {
            require_database(plugin.as_ref())?
                .get_all_posts()
                .await
                .map(Some)
        })
        .await
        .into_app_result()?
        .unwrap_or_default();

    Ok(ApiResponse::ok(PostsResponse { posts }))
}

/// Fetch one post.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PostRecord>> {
    let post = state
        .executor
        .execute_for_capability(Capability::Database, |plugin| {
            let id = id.clone();
            async move { require_database(plugin.as_ref())?.get_post_by_id(&id).await }
        })
        .await
        .into_app_result()?
        .ok_or_else(|| AppError::NotFound(format!("Post not found: {id}")))?;

    Ok(ApiResponse::ok(post))
}

/// Create a post.
async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreatePostRequest>,
) -> AppResult<ApiResponse<PostRecord>> {
    req.validate()?;

    let input = NewPost {
        title: req.title,
        body: req.body,
        image: req.image,
        author: req.author,
        community: req.community,
    };

    let post = state
        .executor
        .execute_for_capability(Capability::Database, |plugin| {
            let input = input.clone();
            async move {
                require_database(plugin.as_ref())?
                    .create_post(input)
                    .await
                    .map(Some)
            }
        })
        .await
        .into_app_result()?
        .ok_or_else(|| AppError::Plugin("no enabled database plugin".to_string()))?;

    info!(post_id = %post.id, author = %post.author, "Post created");

    Ok(ApiResponse::created(post))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
}
