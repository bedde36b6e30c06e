//! Undo activity.

use activitypub_federation::kinds::activity::UndoType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::required_url;
use crate::error::FederationError;

/// `ActivityPub` Undo activity.
///
/// Every Undo is treated as an unfollow; the inner object is kept only so
/// it can be logged.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoActivity {
    #[serde(rename = "type")]
    pub kind: UndoType,
    pub id: Url,
    pub actor: Url,
    /// The activity being undone.
    pub object: Value,
}

impl UndoActivity {
    /// Create a new Undo activity.
    #[must_use]
    pub const fn new(id: Url, actor: Url, object: Value) -> Self {
        Self {
            kind: UndoType::Undo,
            id,
            actor,
            object,
        }
    }

    /// Validate a raw inbound Undo.
    pub fn from_value(activity: &Value) -> Result<Self, FederationError> {
        let id = required_url(activity, "id")?;
        let actor = required_url(activity, "actor")?;
        let object = match activity.get("object") {
            None | Some(Value::Null) => {
                return Err(FederationError::ActivityMalformed(
                    "missing `object`".to_string(),
                ));
            }
            Some(object) => object.clone(),
        };

        Ok(Self::new(id, actor, object))
    }

    /// Type of the undone activity, when it is embedded.
    #[must_use]
    pub fn object_type(&self) -> Option<&str> {
        super::activity_type(&self.object)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_keeps_inner_object() {
        let undo = UndoActivity::from_value(&json!({
            "type": "Undo",
            "id": "https://remote.example/undos/1",
            "actor": "https://remote.example/users/bob",
            "object": { "type": "Follow", "id": "https://remote.example/follows/1" },
        }))
        .unwrap();

        assert_eq!(undo.object_type(), Some("Follow"));
    }

    #[test]
    fn test_from_value_rejects_null_object() {
        let err = UndoActivity::from_value(&json!({
            "type": "Undo",
            "id": "https://remote.example/undos/1",
            "actor": "https://remote.example/users/bob",
            "object": null,
        }))
        .unwrap_err();

        assert!(matches!(err, FederationError::ActivityMalformed(_)));
    }
}
