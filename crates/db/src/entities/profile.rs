//! Profile entity (local actors).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A local actor. An actor URI is "known" iff a profile row exists for it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Identifier issued by the authentication backend
    #[sea_orm(nullable)]
    pub auth_id: Option<String>,

    #[sea_orm(unique)]
    pub actor_uri: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
