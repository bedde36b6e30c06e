//! Create actor key table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActorKey::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActorKey::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActorKey::AuthId).string_len(128))
                    .col(ColumnDef::new(ActorKey::ActorUri).string_len(1024).not_null())
                    .col(ColumnDef::new(ActorKey::PublicKey).text().not_null())
                    .col(ColumnDef::new(ActorKey::PrivateKey).text().not_null())
                    .col(
                        ColumnDef::new(ActorKey::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (actor_uri, created_at) for picking the active key
        manager
            .create_index(
                Index::create()
                    .name("idx_actor_key_actor_uri_created_at")
                    .table(ActorKey::Table)
                    .col(ActorKey::ActorUri)
                    .col(ActorKey::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActorKey::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ActorKey {
    Table,
    Id,
    AuthId,
    ActorUri,
    PublicKey,
    PrivateKey,
    CreatedAt,
}
