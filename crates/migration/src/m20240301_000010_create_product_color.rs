//! Create `product_color` join table with per-association price/stock overrides.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProductColor::Table)
                    .if_not_exists()
                    .col(uuid(ProductColor::Id).primary_key())
                    .col(uuid(ProductColor::ProductId))
                    .col(uuid(ProductColor::ColorId))
                    .col(big_integer_null(ProductColor::PriceCents))
                    .col(integer_null(ProductColor::Stock))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_color_product")
                            .from(ProductColor::Table, ProductColor::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_color_color")
                            .from(ProductColor::Table, ProductColor::ColorId)
                            .to(Color::Table, Color::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProductColor::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ProductColor { Table, Id, ProductId, ColorId, PriceCents, Stock }

#[derive(DeriveIden)]
enum Product { Table, Id }

#[derive(DeriveIden)]
enum Color { Table, Id }
