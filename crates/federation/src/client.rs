//! `ActivityPub` HTTP client.
//!
//! Fetches remote actor documents and sends signed activities to remote
//! inboxes.

use async_trait::async_trait;
use reqwest::Client;
use rsa::RsaPrivateKey;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::delivery::{ActivityDelivery, RemoteActor, RemoteActorResolver};
use crate::error::FederationError;
use crate::signature::{HttpSigner, SignatureError};

const ACTIVITY_JSON: &str = "application/activity+json";

/// Error type for AP client operations.
#[derive(Debug, thiserror::Error)]
pub enum ApClientError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Signing failed: {0}")]
    SigningError(#[from] SignatureError),
    #[error("Invalid activity: {0}")]
    InvalidActivity(#[from] serde_json::Error),
    #[error("Delivery failed: {status} - {body}")]
    DeliveryFailed { status: u16, body: String },
}

/// `ActivityPub` HTTP client.
#[derive(Clone)]
pub struct ApClient {
    client: Client,
    user_agent: String,
}

impl ApClient {
    /// Create a new AP client identifying as the instance at `instance_url`.
    pub fn new(instance_url: &str) -> Result<Self, ApClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let user_agent = format!(
            "linkgator/{} (+{instance_url})",
            env!("CARGO_PKG_VERSION")
        );

        Ok(Self { client, user_agent })
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Deliver an activity to a remote inbox, signed with `private_key`.
    pub async fn deliver_signed(
        &self,
        inbox: &Url,
        activity: &Value,
        private_key: &RsaPrivateKey,
        key_id: &str,
    ) -> Result<(), ApClientError> {
        let body = serde_json::to_vec(activity)?;

        let signer = HttpSigner::new(private_key.clone(), key_id);
        let mut additional_headers = BTreeMap::new();
        additional_headers.insert("content-type".to_string(), ACTIVITY_JSON.to_string());
        let headers = signer.sign_request("POST", inbox, Some(&body), &additional_headers)?;

        debug!(
            inbox = %inbox,
            activity_type = activity.get("type").and_then(serde_json::Value::as_str).unwrap_or("Unknown"),
            "Delivering activity"
        );

        let response = self
            .client
            .post(inbox.clone())
            .headers(headers)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/activity+json, application/ld+json")
            .body(body)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            info!(inbox = %inbox, status = %status, "Activity delivered successfully");
            Ok(())
        } else if status.as_u16() == 410 {
            // The remote actor is gone; retrying would not help
            warn!(inbox = %inbox, "Remote actor is gone (410)");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            error!(
                inbox = %inbox,
                status = %status,
                body = %body,
                "Activity delivery failed"
            );
            Err(ApClientError::DeliveryFailed {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Fetch a remote actor document by its id.
    pub async fn fetch_actor(&self, actor_url: &Url) -> Result<Value, ApClientError> {
        debug!(actor_url = %actor_url, "Fetching remote actor");

        let response = self
            .client
            .get(actor_url.clone())
            .header("User-Agent", &self.user_agent)
            .header(
                "Accept",
                "application/activity+json, application/ld+json; profile=\"https://www.w3.org/ns/activitystreams\"",
            )
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApClientError::DeliveryFailed {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl RemoteActorResolver for ApClient {
    async fn resolve(&self, actor: &Url) -> Result<RemoteActor, FederationError> {
        let document = self
            .fetch_actor(actor)
            .await
            .map_err(|e| FederationError::ActorUnresolvable(format!("{actor}: {e}")))?;
        RemoteActor::from_document(&document, actor)
    }
}

#[async_trait]
impl ActivityDelivery for ApClient {
    async fn deliver(
        &self,
        inbox: &Url,
        activity: &Value,
        private_key: &RsaPrivateKey,
        key_id: &str,
    ) -> Result<(), FederationError> {
        self.deliver_signed(inbox, activity, private_key, key_id)
            .await
            .map_err(|e| FederationError::Delivery(format!("{inbox}: {e}")))
    }
}
