//! Create post table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Post::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Post::Title).string_len(512).not_null())
                    .col(ColumnDef::new(Post::Body).text())
                    .col(ColumnDef::new(Post::Image).string_len(1024))
                    .col(ColumnDef::new(Post::Author).string_len(256).not_null())
                    .col(ColumnDef::new(Post::Community).string_len(256).not_null())
                    .col(ColumnDef::new(Post::Upvotes).integer().not_null().default(0))
                    .col(ColumnDef::new(Post::Downvotes).integer().not_null().default(0))
                    .col(ColumnDef::new(Post::Comments).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Post::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: created_at (for the front page)
        manager
            .create_index(
                Index::create()
                    .name("idx_post_created_at")
                    .table(Post::Table)
                    .col(Post::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
    Title,
    Body,
    Image,
    Author,
    Community,
    Upvotes,
    Downvotes,
    Comments,
    CreatedAt,
}
