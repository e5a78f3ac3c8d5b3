use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(News::Table)
                    .if_not_exists()
                    .col(uuid(News::Id).primary_key())
                    .col(uuid(News::StoreId))
                    .col(string_len(News::Title, 255))
                    .col(string_len(News::Slug, 160))
                    .col(text(News::Content))
                    .col(string_len_null(News::ImageUrl, 1024))
                    .col(boolean(News::IsPublished).default(false))
                    .col(timestamp_with_time_zone(News::CreatedAt))
                    .col(timestamp_with_time_zone(News::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_news_store")
                            .from(News::Table, News::StoreId)
                            .to(Store::Table, Store::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(News::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum News { Table, Id, StoreId, Title, Slug, Content, ImageUrl, IsPublished, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Store { Table, Id }
