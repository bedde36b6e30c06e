//! Actor key entity (RSA keys for `ActivityPub` signing).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Signing key pair for an actor.
/// Several rows may exist per actor; the most recently created one is active.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "actor_key")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(nullable)]
    pub auth_id: Option<String>,

    pub actor_uri: String,

    /// Public half as JWK JSON
    #[sea_orm(column_type = "Text")]
    pub public_key: String,

    /// Private half as JWK JSON
    #[sea_orm(column_type = "Text")]
    pub private_key: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
