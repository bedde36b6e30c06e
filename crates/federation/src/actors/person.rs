//! `ActivityPub` Person actor.

use activitypub_federation::kinds::actor::PersonType;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::activities::AS_CONTEXT;

/// The security vocabulary carrying `publicKey`.
pub const SECURITY_CONTEXT: &str = "https://w3id.org/security/v1";

/// `ActivityPub` Person actor.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApPerson {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub kind: PersonType,
    pub id: Url,
    pub name: String,
    pub preferred_username: String,
    pub url: Url,
    pub inbox: Url,
    pub endpoints: ApEndpoints,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<ApPublicKey>,

    /// Ids of every key this actor signs with.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_method: Vec<String>,
}

/// Actor endpoints.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApEndpoints {
    pub shared_inbox: Url,
}

/// `ActivityPub` public key.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApPublicKey {
    pub id: String,
    pub owner: Url,
    pub public_key_pem: String,
}

impl ApPerson {
    /// Create a new Person actor without keys.
    #[must_use]
    pub fn new(id: Url, username: String, url: Url, inbox: Url, shared_inbox: Url) -> Self {
        Self {
            context: vec![AS_CONTEXT.to_string(), SECURITY_CONTEXT.to_string()],
            kind: PersonType::Person,
            id,
            name: username.clone(),
            preferred_username: username,
            url,
            inbox,
            endpoints: ApEndpoints { shared_inbox },
            public_key: None,
            assertion_method: Vec::new(),
        }
    }

    /// Publish the actor's keys.
    ///
    /// The first key becomes `publicKey`; all of them are listed in
    /// `assertionMethod`.
    #[must_use]
    pub fn with_keys(mut self, keys: Vec<ApPublicKey>) -> Self {
        self.assertion_method = keys.iter().map(|key| key.id.clone()).collect();
        self.public_key = keys.into_iter().next();
        self
    }
}
