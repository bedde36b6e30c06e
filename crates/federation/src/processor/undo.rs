//! Undo activity processor.

use linkgator_common::metrics::FederationMetrics;
use linkgator_plugins::{Capability, PluginExecutor, require_database};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use super::ProcessOutcome;
use crate::activities::UndoActivity;
use crate::error::FederationError;

/// Processor for Undo activities.
///
/// Any Undo removes every follower relation of the undoing actor,
/// whatever the inner object is.
#[derive(Clone)]
pub struct UndoProcessor {
    executor: PluginExecutor,
    metrics: Arc<FederationMetrics>,
}

impl UndoProcessor {
    /// Create a new undo processor.
    #[must_use]
    pub const fn new(executor: PluginExecutor, metrics: Arc<FederationMetrics>) -> Self {
        Self { executor, metrics }
    }

    /// Process an incoming Undo activity. Storage failures are only logged.
    pub async fn process(&self, raw: &Value) -> Result<ProcessOutcome, FederationError> {
        let undo = UndoActivity::from_value(raw)?;

        info!(
            actor = %undo.actor,
            object_type = undo.object_type().unwrap_or("unknown"),
            "Processing Undo activity"
        );

        let outcome = self
            .executor
            .execute_for_capability(Capability::Database, |plugin| {
                let follower = undo.actor.to_string();
                async move {
                    require_database(plugin.as_ref())?
                        .remove_follower(&follower)
                        .await
                        .map(Some)
                }
            })
            .await;

        let persisted = match outcome.into_result() {
            Ok(Some(())) => {
                FederationMetrics::incr(&self.metrics.followers_removed);
                true
            }
            Ok(None) => {
                warn!(actor = %undo.actor, "No database plugin removed the follower");
                false
            }
            Err(errors) => {
                warn!(
                    actor = %undo.actor,
                    errors = errors.len(),
                    "Removing follower failed"
                );
                false
            }
        };

        Ok(ProcessOutcome::Unfollowed {
            follower: undo.actor,
            persisted,
        })
    }
}
