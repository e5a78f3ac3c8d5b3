//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_user;
mod m20240301_000002_create_user_credentials;
mod m20240301_000003_create_store;
mod m20240301_000004_create_billboard;
mod m20240301_000005_create_category;
mod m20240301_000006_create_subcategory;
mod m20240301_000007_create_color;
mod m20240301_000008_create_size;
mod m20240301_000009_create_product;
mod m20240301_000010_create_product_color;
mod m20240301_000011_create_product_size;
mod m20240301_000012_create_service;
mod m20240301_000013_create_image;
mod m20240301_000014_create_news;
mod m20240301_000015_create_order;
mod m20240301_000016_create_order_item;
mod m20240301_000017_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_user::Migration),
            Box::new(m20240301_000002_create_user_credentials::Migration),
            Box::new(m20240301_000003_create_store::Migration),
            Box::new(m20240301_000004_create_billboard::Migration),
            Box::new(m20240301_000005_create_category::Migration),
            Box::new(m20240301_000006_create_subcategory::Migration),
            Box::new(m20240301_000007_create_color::Migration),
            Box::new(m20240301_000008_create_size::Migration),
            Box::new(m20240301_000009_create_product::Migration),
            Box::new(m20240301_000010_create_product_color::Migration),
            Box::new(m20240301_000011_create_product_size::Migration),
            Box::new(m20240301_000012_create_service::Migration),
            Box::new(m20240301_000013_create_image::Migration),
            Box::new(m20240301_000014_create_news::Migration),
            Box::new(m20240301_000015_create_order::Migration),
            Box::new(m20240301_000016_create_order_item::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000017_add_indexes::Migration),
        ]
    }
}
