//! Create follower table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Follower::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Follower::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Follower::FollowerActorUri)
                            .string_len(1024)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Follower::ActorUri).string_len(1024).not_null())
                    .col(
                        ColumnDef::new(Follower::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (follower_actor_uri, actor_uri) - prevent duplicate follows
        manager
            .create_index(
                Index::create()
                    .name("idx_follower_follower_actor")
                    .table(Follower::Table)
                    .col(Follower::FollowerActorUri)
                    .col(Follower::ActorUri)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: actor_uri (for listing followers of a local actor)
        manager
            .create_index(
                Index::create()
                    .name("idx_follower_actor_uri")
                    .table(Follower::Table)
                    .col(Follower::ActorUri)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Follower::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Follower {
    Table,
    Id,
    FollowerActorUri,
    ActorUri,
    CreatedAt,
}
