//! ActivityPub federation for LinkGator.
//!
//! Only the follow graph federates:
//!
//! - **Activities**: Follow, Undo and Accept
//! - **Actors**: Person documents for local profiles
//! - **Keys**: lazily provisioned RSA key pairs per actor
//! - **Processor**: the Follow/Undo/Accept state machine behind the inboxes
//! - **Handlers**: actor documents, inboxes and `WebFinger`
//! - **Delivery**: signed outbound requests (draft-cavage HTTP signatures)
//!
//! Persistence always goes through the database capability of the plugin
//! registry; this crate never talks to a storage backend directly.

pub mod accounts;
pub mod activities;
pub mod actors;
pub mod client;
pub mod delivery;
pub mod error;
pub mod handler;
pub mod keys;
pub mod processor;
pub mod profiles;
pub mod signature;
pub mod urls;

pub use accounts::{AccountService, RegisteredAccount};
pub use activities::{AcceptActivity, FollowActivity, UndoActivity};
pub use actors::{ApPerson, ApPublicKey};
pub use client::{ApClient, ApClientError};
pub use delivery::{ActivityDelivery, RemoteActor, RemoteActorResolver};
pub use error::FederationError;
pub use handler::{FederationState, router};
pub use keys::{ActorKeyPair, KeyPairDispatcher};
pub use processor::{FollowProcessor, InboxProcessor, ProcessOutcome, UndoProcessor};
pub use self::signature::{HttpSigner, SignatureError, calculate_digest};
pub use urls::UrlConfig;
