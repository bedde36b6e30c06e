//! `ActivityPub` request handlers.

#![allow(missing_docs)]

mod actor;
mod inbox;
mod webfinger;

pub use actor::actor_handler;
pub use inbox::{shared_inbox_handler, user_inbox_handler};
pub use webfinger::{WebfingerLink, WebfingerQuery, WebfingerResponse, webfinger_handler};

use axum::{
    Router,
    routing::{get, post},
};
use linkgator_common::metrics::FederationMetrics;
use linkgator_plugins::PluginExecutor;
use std::sync::Arc;

use crate::delivery::{ActivityDelivery, RemoteActorResolver};
use crate::keys::KeyPairDispatcher;
use crate::processor::{FollowProcessor, InboxProcessor, UndoProcessor};
use crate::urls::UrlConfig;

/// Shared state of the federation routes.
#[derive(Clone)]
pub struct FederationState {
    pub executor: PluginExecutor,
    pub keys: KeyPairDispatcher,
    pub urls: UrlConfig,
    pub processor: InboxProcessor,
}

impl FederationState {
    /// Wire the dispatcher and inbox processors around `executor`.
    #[must_use]
    pub fn new(
        executor: PluginExecutor,
        urls: UrlConfig,
        key_bits: usize,
        resolver: Arc<dyn RemoteActorResolver>,
        delivery: Arc<dyn ActivityDelivery>,
        metrics: Arc<FederationMetrics>,
    ) -> Self {
        let keys = KeyPairDispatcher::new(executor.clone(), key_bits, metrics.clone());
        let follow = FollowProcessor::new(
            executor.clone(),
            keys.clone(),
            urls.clone(),
            resolver,
            delivery,
            metrics.clone(),
        );
        let undo = UndoProcessor::new(executor.clone(), metrics.clone());

        Self {
            executor,
            keys,
            urls,
            processor: InboxProcessor::new(follow, undo, metrics),
        }
    }
}

/// Federation routes: actor documents, inboxes and `WebFinger`.
pub fn router(state: FederationState) -> Router {
    Router::new()
        .route("/users/{identifier}", get(actor_handler))
        .route("/users/{identifier}/inbox", post(user_inbox_handler))
        .route("/inbox", post(shared_inbox_handler))
        .route("/.well-known/webfinger", get(webfinger_handler))
        .with_state(state)
}
