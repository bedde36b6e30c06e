//! Profile lookups through the database capability.

use linkgator_plugins::{Capability, PluginExecutor, ProfileRecord, require_database};

use crate::error::FederationError;

/// Look up the profile of a local actor.
///
/// Any failing database plugin turns the whole lookup into a
/// `Storage` error.
pub async fn find_profile(
    executor: &PluginExecutor,
    actor_uri: &str,
) -> Result<Option<ProfileRecord>, FederationError> {
    executor
        .execute_for_capability(Capability::Database, |plugin| {
            let actor_uri = actor_uri.to_string();
            async move {
                require_database(plugin.as_ref())?
                    .get_profile_from_actor_uri(&actor_uri)
                    .await
            }
        })
        .await
        .into_result()
        .map_err(|errors| {
            FederationError::Storage(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })
}
