//! Federation error types.

use linkgator_common::AppError;
use thiserror::Error;

/// Errors raised while handling federation traffic.
///
/// Inbound activities that fail with any of these are dropped, never
/// answered with an error.
#[derive(Debug, Clone, Error)]
pub enum FederationError {
    /// Stored key material could not be decoded, or none is available.
    #[error("Invalid key material: {0}")]
    KeyMaterialInvalid(String),

    /// A required activity member is missing or unparseable.
    #[error("Malformed activity: {0}")]
    ActivityMalformed(String),

    /// The local or remote actor could not be resolved.
    #[error("Actor unresolvable: {0}")]
    ActorUnresolvable(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// The database capability failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<FederationError> for AppError {
    fn from(err: FederationError) -> Self {
        match err {
            FederationError::ActivityMalformed(_) => Self::BadRequest(err.to_string()),
            FederationError::ActorUnresolvable(_) => Self::NotFound(err.to_string()),
            FederationError::Storage(_) => Self::Database(err.to_string()),
            FederationError::KeyMaterialInvalid(_) | FederationError::Delivery(_) => {
                Self::Federation(err.to_string())
            }
        }
    }
}
