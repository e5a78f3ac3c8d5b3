#![cfg(test)]
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use models::{store, user};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

/// Fresh in-memory database with the full schema. Each call is isolated.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_with_config(&DatabaseConfig::sqlite_memory()).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// A user with one store.
pub async fn seed_owner(db: &DatabaseConnection, name: &str) -> Result<(user::Model, store::Model), anyhow::Error> {
    let email = format!("{}_{}@example.com", name, Uuid::new_v4().simple());
    let u = user::create(db, &email, name).await?;
    let s = store::create(db, u.id, &format!("{name} store")).await?;
    Ok((u, s))
}
