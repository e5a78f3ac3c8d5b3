//! Create `category` table.
//!
//! Self-referencing through `parent_id`. The parent FK has no delete action:
//! the service layer refuses to delete a category that still has children.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Category::Table)
                    .if_not_exists()
                    .col(uuid(Category::Id).primary_key())
                    .col(uuid(Category::StoreId))
                    .col(uuid_null(Category::ParentId))
                    .col(uuid_null(Category::BillboardId))
                    .col(string_len(Category::Name, 128))
                    .col(string_len(Category::Slug, 160))
                    .col(timestamp_with_time_zone(Category::CreatedAt))
                    .col(timestamp_with_time_zone(Category::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_store")
                            .from(Category::Table, Category::StoreId)
                            .to(Store::Table, Store::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_parent")
                            .from(Category::Table, Category::ParentId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_billboard")
                            .from(Category::Table, Category::BillboardId)
                            .to(Billboard::Table, Billboard::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Category::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Category { Table, Id, StoreId, ParentId, BillboardId, Name, Slug, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Store { Table, Id }

#[derive(DeriveIden)]
enum Billboard { Table, Id }
