//! `ActivityPub` activity types.
//!
//! Only the follow graph is modeled. Inbound activities arrive as raw JSON
//! and are validated member by member so a malformed activity can be
//! reported precisely before it is dropped.

#![allow(missing_docs)]

mod accept;
mod follow;
mod undo;

pub use accept::AcceptActivity;
pub use follow::FollowActivity;
pub use undo::UndoActivity;

use serde_json::Value;
use url::Url;

use crate::error::FederationError;

/// The `ActivityStreams` JSON-LD context.
pub const AS_CONTEXT: &str = "https://www.w3.org/ns/activitystreams";

/// The `type` member of a raw activity.
#[must_use]
pub fn activity_type(activity: &Value) -> Option<&str> {
    activity.get("type").and_then(Value::as_str)
}

/// Read a member holding either a URL string or an object with an `id`.
pub(crate) fn required_url(activity: &Value, member: &'static str) -> Result<Url, FederationError> {
    let raw = match activity.get(member) {
        None | Some(Value::Null) => {
            return Err(FederationError::ActivityMalformed(format!(
                "missing `{member}`"
            )));
        }
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Object(map)) => map.get("id").and_then(Value::as_str).ok_or_else(|| {
            FederationError::ActivityMalformed(format!("`{member}` has no id"))
        })?,
        Some(_) => {
            return Err(FederationError::ActivityMalformed(format!(
                "`{member}` is neither a URL nor an object"
            )));
        }
    };

    Url::parse(raw)
        .map_err(|e| FederationError::ActivityMalformed(format!("`{member}` is not a URL: {e}")))
}
