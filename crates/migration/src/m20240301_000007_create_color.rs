use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Color::Table)
                    .if_not_exists()
                    .col(uuid(Color::Id).primary_key())
                    .col(uuid(Color::StoreId))
                    .col(string_len(Color::Name, 64))
                    .col(string_len(Color::Value, 64))
                    .col(timestamp_with_time_zone(Color::CreatedAt))
                    .col(timestamp_with_time_zone(Color::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_color_store")
                            .from(Color::Table, Color::StoreId)
                            .to(Store::Table, Store::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Color::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Color { Table, Id, StoreId, Name, Value, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Store { Table, Id }
