//! Create `order` table.
//!
//! Customer contact fields are a snapshot taken at checkout, not a FK.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Order::Table)
                    .if_not_exists()
                    .col(uuid(Order::Id).primary_key())
                    .col(uuid(Order::StoreId))
                    .col(string_len(Order::Username, 128))
                    .col(string_len(Order::Phone, 64))
                    .col(string_len(Order::Address, 512))
                    .col(string_len(Order::Status, 32))
                    .col(boolean(Order::IsPaid).default(false))
                    .col(timestamp_with_time_zone(Order::CreatedAt))
                    .col(timestamp_with_time_zone(Order::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_store")
                            .from(Order::Table, Order::StoreId)
                            .to(Store::Table, Store::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Order::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Order { Table, Id, StoreId, Username, Phone, Address, Status, IsPaid, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Store { Table, Id }
