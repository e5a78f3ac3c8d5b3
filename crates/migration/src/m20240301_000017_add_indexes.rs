//! Lookup indexes plus the per-store slug uniqueness constraints.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Slugs are unique within a store
        manager
            .create_index(
                Index::create()
                    .name("uniq_category_store_slug")
                    .table(Category::Table)
                    .col(Category::StoreId)
                    .col(Category::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uniq_subcategory_store_slug")
                    .table(Subcategory::Table)
                    .col(Subcategory::StoreId)
                    .col(Subcategory::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uniq_product_store_slug")
                    .table(Product::Table)
                    .col(Product::StoreId)
                    .col(Product::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uniq_service_store_slug")
                    .table(Service::Table)
                    .col(Service::StoreId)
                    .col(Service::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uniq_news_store_slug")
                    .table(News::Table)
                    .col(News::StoreId)
                    .col(News::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Join tables: one row per (product, option)
        manager
            .create_index(
                Index::create()
                    .name("uniq_product_color")
                    .table(ProductColor::Table)
                    .col(ProductColor::ProductId)
                    .col(ProductColor::ColorId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("uniq_product_size")
                    .table(ProductSize::Table)
                    .col(ProductSize::ProductId)
                    .col(ProductSize::SizeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_store_user")
                    .table(Store::Table)
                    .col(Store::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_billboard_store")
                    .table(Billboard::Table)
                    .col(Billboard::StoreId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_category_parent")
                    .table(Category::Table)
                    .col(Category::ParentId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_order_store")
                    .table(Order::Table)
                    .col(Order::StoreId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_order_item_order")
                    .table(OrderItem::Table)
                    .col(OrderItem::OrderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_category_store_slug").table(Category::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_subcategory_store_slug").table(Subcategory::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_product_store_slug").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_service_store_slug").table(Service::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_news_store_slug").table(News::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_product_color").table(ProductColor::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_product_size").table(ProductSize::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_store_user").table(Store::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_billboard_store").table(Billboard::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_category_parent").table(Category::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_order_store").table(Order::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_order_item_order").table(OrderItem::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Store { Table, UserId }

#[derive(DeriveIden)]
enum Billboard { Table, StoreId }

#[derive(DeriveIden)]
enum Category { Table, StoreId, ParentId, Slug }

#[derive(DeriveIden)]
enum Subcategory { Table, StoreId, Slug }

#[derive(DeriveIden)]
enum Product { Table, StoreId, Slug }

#[derive(DeriveIden)]
enum Service { Table, StoreId, Slug }

#[derive(DeriveIden)]
enum News { Table, StoreId, Slug }

#[derive(DeriveIden)]
enum ProductColor { Table, ProductId, ColorId }

#[derive(DeriveIden)]
enum ProductSize { Table, ProductId, SizeId }

#[derive(DeriveIden)]
enum Order { Table, StoreId }

#[derive(DeriveIden)]
enum OrderItem { Table, OrderId }
