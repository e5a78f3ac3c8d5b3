use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subcategory::Table)
                    .if_not_exists()
                    .col(uuid(Subcategory::Id).primary_key())
                    .col(uuid(Subcategory::StoreId))
                    .col(uuid(Subcategory::CategoryId))
                    .col(uuid_null(Subcategory::BillboardId))
                    .col(string_len(Subcategory::Name, 128))
                    .col(string_len(Subcategory::Slug, 160))
                    .col(timestamp_with_time_zone(Subcategory::CreatedAt))
                    .col(timestamp_with_time_zone(Subcategory::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subcategory_store")
                            .from(Subcategory::Table, Subcategory::StoreId)
                            .to(Store::Table, Store::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subcategory_category")
                            .from(Subcategory::Table, Subcategory::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subcategory_billboard")
                            .from(Subcategory::Table, Subcategory::BillboardId)
                            .to(Billboard::Table, Billboard::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Subcategory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Subcategory { Table, Id, StoreId, CategoryId, BillboardId, Name, Slug, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Store { Table, Id }

#[derive(DeriveIden)]
enum Category { Table, Id }

#[derive(DeriveIden)]
enum Billboard { Table, Id }
