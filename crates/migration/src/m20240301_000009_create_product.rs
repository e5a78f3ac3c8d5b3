//! Create `product` table.
//!
//! Prices are integer minor units. Category/subcategory FKs have no delete
//! action so a category with products cannot silently lose them.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Product::Table)
                    .if_not_exists()
                    .col(uuid(Product::Id).primary_key())
                    .col(uuid(Product::StoreId))
                    .col(uuid(Product::CategoryId))
                    .col(uuid_null(Product::SubcategoryId))
                    .col(string_len(Product::Name, 255))
                    .col(string_len(Product::Slug, 160))
                    .col(text(Product::Description))
                    .col(big_integer(Product::PriceCents))
                    .col(integer(Product::Stock).default(0))
                    .col(boolean(Product::IsFeatured).default(false))
                    .col(boolean(Product::IsArchived).default(false))
                    .col(timestamp_with_time_zone(Product::CreatedAt))
                    .col(timestamp_with_time_zone(Product::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_store")
                            .from(Product::Table, Product::StoreId)
                            .to(Store::Table, Store::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_category")
                            .from(Product::Table, Product::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_subcategory")
                            .from(Product::Table, Product::SubcategoryId)
                            .to(Subcategory::Table, Subcategory::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Product::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Product {
    Table,
    Id,
    StoreId,
    CategoryId,
    SubcategoryId,
    Name,
    Slug,
    Description,
    PriceCents,
    Stock,
    IsFeatured,
    IsArchived,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Store { Table, Id }

#[derive(DeriveIden)]
enum Category { Table, Id }

#[derive(DeriveIden)]
enum Subcategory { Table, Id }
