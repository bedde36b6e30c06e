//! Outbound seams of the inbox processor.
//!
//! The processor resolves remote actors and delivers activities only
//! through these traits, so it can run against fakes in tests and against
//! [`ApClient`](crate::client::ApClient) in production.

use async_trait::async_trait;
use rsa::RsaPrivateKey;
use serde_json::Value;
use url::Url;

use crate::error::FederationError;

/// The parts of a remote actor document the processor needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteActor {
    pub id: Url,
    pub inbox: Url,
    pub shared_inbox: Option<Url>,
    pub preferred_username: Option<String>,
}

impl RemoteActor {
    /// Extract the actor from a fetched document.
    ///
    /// `sharedInbox` is read from `endpoints` first, then from the top
    /// level.
    pub fn from_document(document: &Value, fetched_from: &Url) -> Result<Self, FederationError> {
        let id = match document.get("id").and_then(Value::as_str) {
            Some(id) => Url::parse(id)
                .map_err(|e| FederationError::ActorUnresolvable(format!("bad actor id: {e}")))?,
            None => fetched_from.clone(),
        };

        let inbox = document
            .get("inbox")
            .and_then(Value::as_str)
            .ok_or_else(|| FederationError::ActorUnresolvable(format!("{id} has no inbox")))
            .and_then(|inbox| {
                Url::parse(inbox).map_err(|e| {
                    FederationError::ActorUnresolvable(format!("{id} has a bad inbox: {e}"))
                })
            })?;

        let shared_inbox = document
            .get("endpoints")
            .and_then(|e| e.get("sharedInbox"))
            .or_else(|| document.get("sharedInbox"))
            .and_then(Value::as_str)
            .and_then(|s| Url::parse(s).ok());

        let preferred_username = document
            .get("preferredUsername")
            .and_then(Value::as_str)
            .map(String::from);

        Ok(Self {
            id,
            inbox,
            shared_inbox,
            preferred_username,
        })
    }
}

/// Looks up remote actor documents.
#[async_trait]
pub trait RemoteActorResolver: Send + Sync {
    async fn resolve(&self, actor: &Url) -> Result<RemoteActor, FederationError>;
}

/// Delivers signed activities to remote inboxes.
#[async_trait]
pub trait ActivityDelivery: Send + Sync {
    async fn deliver(
        &self,
        inbox: &Url,
        activity: &Value,
        private_key: &RsaPrivateKey,
        key_id: &str,
    ) -> Result<(), FederationError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_from_document() {
        let actor = RemoteActor::from_document(
            &json!({
                "id": "https://remote.example/users/bob",
                "type": "Person",
                "preferredUsername": "bob",
                "inbox": "https://remote.example/users/bob/inbox",
                "endpoints": { "sharedInbox": "https://remote.example/inbox" },
            }),
            &url("https://remote.example/users/bob"),
        )
        .unwrap();

        assert_eq!(actor.inbox.as_str(), "https://remote.example/users/bob/inbox");
        assert_eq!(
            actor.shared_inbox.as_ref().map(Url::as_str),
            Some("https://remote.example/inbox")
        );
        assert_eq!(actor.preferred_username.as_deref(), Some("bob"));
    }

    #[test]
    fn test_from_document_requires_inbox() {
        let err = RemoteActor::from_document(
            &json!({ "id": "https://remote.example/users/bob" }),
            &url("https://remote.example/users/bob"),
        )
        .unwrap_err();

        assert!(matches!(err, FederationError::ActorUnresolvable(_)));
    }
}
