use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Size::Table)
                    .if_not_exists()
                    .col(uuid(Size::Id).primary_key())
                    .col(uuid(Size::StoreId))
                    .col(string_len(Size::Name, 64))
                    .col(string_len(Size::Value, 64))
                    .col(timestamp_with_time_zone(Size::CreatedAt))
                    .col(timestamp_with_time_zone(Size::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_size_store")
                            .from(Size::Table, Size::StoreId)
                            .to(Store::Table, Store::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Size::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Size { Table, Id, StoreId, Name, Value, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Store { Table, Id }
