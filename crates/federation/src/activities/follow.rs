//! Follow activity.

use activitypub_federation::kinds::activity::FollowType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::required_url;
use crate::error::FederationError;

/// `ActivityPub` Follow activity.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowActivity {
    #[serde(rename = "type")]
    pub kind: FollowType,
    pub id: Url,
    pub actor: Url,
    /// The actor being followed.
    pub object: Url,
}

impl FollowActivity {
    /// Create a new Follow activity.
    #[must_use]
    pub const fn new(id: Url, actor: Url, object: Url) -> Self {
        Self {
            kind: FollowType::Follow,
            id,
            actor,
            object,
        }
    }

    /// Validate a raw inbound Follow.
    ///
    /// `id`, `actor` and `object` must all be present; `actor` and `object`
    /// may be embedded objects carrying an `id`.
    pub fn from_value(activity: &Value) -> Result<Self, FederationError> {
        Ok(Self::new(
            required_url(activity, "id")?,
            required_url(activity, "actor")?,
            required_url(activity, "object")?,
        ))
    }
}
