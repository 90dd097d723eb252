use sea_orm_migration::{prelude::*, schema::*};

use crate::{m20250301_000001_create_users::Users, m20250301_000002_create_movie::Movie};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(pk_auto(Review::Id))
                    .col(integer(Review::WriterId))
                    .col(integer(Review::ReviewedMovieId))
                    .col(string_len(Review::ReviewTitle, 100))
                    .col(text(Review::Content))
                    .col(
                        integer(Review::Rating)
                            .default(5)
                            .check(Expr::col(Review::Rating).between(1, 10)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_writer")
                            .from(Review::Table, Review::WriterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_reviewed_movie")
                            .from(Review::Table, Review::ReviewedMovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_review_reviewed_movie")
                    .table(Review::Table)
                    .col(Review::ReviewedMovieId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_review_writer")
                    .table(Review::Table)
                    .col(Review::WriterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Review::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Review {
    Table,
    Id,
    WriterId,
    ReviewedMovieId,
    ReviewTitle,
    Content,
    Rating,
}
