use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Billboard::Table)
                    .if_not_exists()
                    .col(uuid(Billboard::Id).primary_key())
                    .col(uuid(Billboard::StoreId))
                    .col(string_len(Billboard::Label, 255))
                    .col(string_len(Billboard::ImageUrl, 1024))
                    .col(boolean(Billboard::IsBanner).default(false))
                    .col(timestamp_with_time_zone(Billboard::CreatedAt))
                    .col(timestamp_with_time_zone(Billboard::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_billboard_store")
                            .from(Billboard::Table, Billboard::StoreId)
                            .to(Store::Table, Store::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Billboard::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Billboard { Table, Id, StoreId, Label, ImageUrl, IsBanner, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Store { Table, Id }
