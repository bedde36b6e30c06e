//! Accept activity.

use activitypub_federation::kinds::activity::AcceptType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::AS_CONTEXT;

/// `ActivityPub` Accept activity.
/// Used to accept a Follow request.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptActivity {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "type")]
    pub kind: AcceptType,
    pub id: Url,
    /// The local actor that was followed.
    pub actor: Url,
    /// The original Follow activity being accepted.
    pub object: Value,
    pub to: Vec<Url>,
}

impl AcceptActivity {
    /// Create a new Accept activity addressed to `follower`.
    #[must_use]
    pub fn new(id: Url, actor: Url, follow: Value, follower: Url) -> Self {
        Self {
            context: AS_CONTEXT.to_string(),
            kind: AcceptType::Accept,
            id,
            actor,
            object: follow,
            to: vec![follower],
        }
    }
}
