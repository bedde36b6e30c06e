//! Inbox activity processing.
//!
//! Inbound activities are dispatched on their `type`. Follow and Undo are
//! handled; everything else is ignored. Failures never surface to the
//! sender: a failing activity is dropped with a warning.

#![allow(missing_docs)]

mod follow;
mod undo;

pub use follow::FollowProcessor;
pub use undo::UndoProcessor;

use linkgator_common::metrics::FederationMetrics;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::activities::activity_type;
use crate::error::FederationError;

/// What happened to an inbound activity.
#[derive(Debug, Clone)]
pub enum ProcessOutcome {
    /// A Follow was answered with an Accept. `persisted` is false when the
    /// relation could not be stored afterwards.
    Accepted {
        follower: Url,
        actor: Url,
        persisted: bool,
    },
    /// An Undo removed the actor's follower relations.
    Unfollowed { follower: Url, persisted: bool },
    /// The activity failed validation or processing.
    Dropped(FederationError),
    /// The activity type is not handled.
    Ignored(Option<String>),
}

/// Routes inbound activities to their processor.
#[derive(Clone)]
pub struct InboxProcessor {
    follow: FollowProcessor,
    undo: UndoProcessor,
    metrics: Arc<FederationMetrics>,
}

impl InboxProcessor {
    #[must_use]
    pub const fn new(
        follow: FollowProcessor,
        undo: UndoProcessor,
        metrics: Arc<FederationMetrics>,
    ) -> Self {
        Self {
            follow,
            undo,
            metrics,
        }
    }

    #[must_use]
    pub fn metrics(&self) -> &Arc<FederationMetrics> {
        &self.metrics
    }

    /// Process one inbound activity.
    pub async fn process(&self, activity: &Value) -> ProcessOutcome {
        FederationMetrics::incr(&self.metrics.activities_received);

        let result = match activity_type(activity) {
            Some("Follow") => self.follow.process(activity).await,
            Some("Undo") => self.undo.process(activity).await,
            other => {
                debug!(activity_type = ?other, "Ignoring unsupported activity");
                return ProcessOutcome::Ignored(other.map(String::from));
            }
        };

        result.unwrap_or_else(|error| {
            FederationMetrics::incr(&self.metrics.activities_dropped);
            warn!(
                activity_type = activity_type(activity).unwrap_or("unknown"),
                error = %error,
                "Dropping inbound activity"
            );
            ProcessOutcome::Dropped(error)
        })
    }
}
