//! Create `product_size` join table with per-association price/stock overrides.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductSize::Table)
                    .if_not_exists()
                    .col(uuid(ProductSize::Id).primary_key())
                    .col(uuid(ProductSize::ProductId))
                    .col(uuid(ProductSize::SizeId))
                    .col(big_integer_null(ProductSize::PriceCents))
                    .col(integer_null(ProductSize::Stock))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_size_product")
                            .from(ProductSize::Table, ProductSize::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_size_size")
                            .from(ProductSize::Table, ProductSize::SizeId)
                            .to(Size::Table, Size::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProductSize::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ProductSize { Table, Id, ProductId, SizeId, PriceCents, Stock }

#[derive(DeriveIden)]
enum Product { Table, Id }

#[derive(DeriveIden)]
enum Size { Table, Id }
