//! Follow activity processor.

use linkgator_common::IdGenerator;
use linkgator_common::metrics::FederationMetrics;
use linkgator_plugins::{Capability, PluginExecutor, require_database};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use super::ProcessOutcome;
use crate::activities::{AcceptActivity, FollowActivity};
use crate::delivery::{ActivityDelivery, RemoteActorResolver};
use crate::error::FederationError;
use crate::keys::KeyPairDispatcher;
use crate::profiles::find_profile;
use crate::urls::UrlConfig;

/// Processor for Follow activities.
///
/// Every Follow of a known local actor is accepted. The Accept is
/// delivered before the follower relation is stored, so a storage failure
/// at that point leaves the remote side believing it follows; this is
/// logged as `follow_state_mismatch` and counted, never rolled back.
#[derive(Clone)]
pub struct FollowProcessor {
    executor: PluginExecutor,
    keys: KeyPairDispatcher,
    urls: UrlConfig,
    resolver: Arc<dyn RemoteActorResolver>,
    delivery: Arc<dyn ActivityDelivery>,
    metrics: Arc<FederationMetrics>,
    id_gen: IdGenerator,
}

impl FollowProcessor {
    /// Create a new follow processor.
    #[must_use]
    pub fn new(
        executor: PluginExecutor,
        keys: KeyPairDispatcher,
        urls: UrlConfig,
        resolver: Arc<dyn RemoteActorResolver>,
        delivery: Arc<dyn ActivityDelivery>,
        metrics: Arc<FederationMetrics>,
    ) -> Self {
        Self {
            executor,
            keys,
            urls,
            resolver,
            delivery,
            metrics,
            id_gen: IdGenerator::new(),
        }
    }

    /// Process an incoming Follow activity.
    ///
    /// Steps run strictly in order: validate, resolve the local actor,
    /// resolve the follower's inbox, deliver the Accept, store the relation.
    pub async fn process(&self, raw: &Value) -> Result<ProcessOutcome, FederationError> {
        let follow = FollowActivity::from_value(raw)?;

        info!(
            actor = %follow.actor,
            object = %follow.object,
            "Processing Follow activity"
        );

        let actor = self.resolve_local_actor(&follow.object).await?;
        let follower = self.resolver.resolve(&follow.actor).await?;

        let key_pair = self
            .keys
            .dispatch(actor.as_str())
            .await
            .into_iter()
            .next()
            .ok_or_else(|| {
                FederationError::KeyMaterialInvalid(format!("no usable key pair for {actor}"))
            })?;

        let accept = AcceptActivity::new(
            self.urls.activity_url(&self.id_gen.generate()),
            actor.clone(),
            raw.clone(),
            follow.actor.clone(),
        );
        let accept = serde_json::to_value(&accept)
            .map_err(|e| FederationError::Delivery(format!("cannot encode Accept: {e}")))?;

        let delivered = self
            .delivery
            .deliver(
                &follower.inbox,
                &accept,
                &key_pair.private_key,
                &UrlConfig::key_id(&actor),
            )
            .await;
        self.metrics.record_accept(delivered.is_ok());
        delivered?;

        let persisted = self.add_follower(follow.actor.as_str(), actor.as_str()).await;

        info!(
            follower = %follow.actor,
            actor = %actor,
            persisted = persisted,
            "Follow accepted"
        );

        Ok(ProcessOutcome::Accepted {
            follower: follow.actor,
            actor,
            persisted,
        })
    }

    /// Map a Follow `object` to a local actor with a stored profile.
    async fn resolve_local_actor(&self, object: &Url) -> Result<Url, FederationError> {
        let identifier = self.urls.local_identifier(object).ok_or_else(|| {
            FederationError::ActorUnresolvable(format!("{object} is not a local actor"))
        })?;
        let actor = self.urls.actor_url(&identifier);

        match find_profile(&self.executor, actor.as_str()).await {
            Ok(Some(_)) => Ok(actor),
            Ok(None) => Err(FederationError::ActorUnresolvable(format!(
                "no profile for {actor}"
            ))),
            Err(e) => Err(FederationError::ActorUnresolvable(format!(
                "profile lookup for {actor} failed: {e}"
            ))),
        }
    }

    async fn add_follower(&self, follower: &str, actor: &str) -> bool {
        let outcome = self
            .executor
            .execute_for_capability(Capability::Database, |plugin| {
                let follower = follower.to_string();
                let actor = actor.to_string();
                async move {
                    require_database(plugin.as_ref())?
                        .add_follower(&follower, &actor)
                        .await
                        .map(Some)
                }
            })
            .await;

        match outcome.into_result() {
            Ok(Some(())) => {
                FederationMetrics::incr(&self.metrics.followers_added);
                true
            }
            Ok(None) => {
                FederationMetrics::incr(&self.metrics.follow_state_mismatches);
                warn!(
                    event = "follow_state_mismatch",
                    follower = %follower,
                    actor = %actor,
                    "Accept sent but no database plugin stored the follower"
                );
                false
            }
            Err(errors) => {
                FederationMetrics::incr(&self.metrics.follow_state_mismatches);
                warn!(
                    event = "follow_state_mismatch",
                    follower = %follower,
                    actor = %actor,
                    errors = errors.len(),
                    "Accept sent but storing the follower failed"
                );
                false
            }
        }
    }
}
