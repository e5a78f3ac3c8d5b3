use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{size, validate};
use crate::access;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizePatch {
    pub name: Option<String>,
    pub value: Option<String>,
}

fn validate_name(name: &str) -> Result<String, ServiceError> {
    Ok(validate::required_text("Name", name, 64)?)
}

fn validate_value(value: &str) -> Result<String, ServiceError> {
    Ok(validate::required_text("Value", value, 32)?)
}

pub async fn list_sizes(db: &DatabaseConnection, store_id: Uuid) -> Result<Vec<size::Model>, ServiceError> {
    access::find_store(db, store_id).await?;
    Ok(size::Entity::find()
        .filter(size::Column::StoreId.eq(store_id))
        .order_by_asc(size::Column::Name)
        .all(db)
        .await?)
}

pub async fn get_size(db: &DatabaseConnection, store_id: Uuid, id: Uuid) -> Result<size::Model, ServiceError> {
    access::scoped::<size::Entity, _>(db, size::Column::Id, size::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Size"))
}

#[instrument(skip(db, input), fields(%store_id))]
pub async fn create_size(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, input: SizeInput) -> Result<size::Model, ServiceError> {
    let name = validate_name(&input.name)?;
    let value = validate_value(&input.value)?;
    access::owned_store(db, store_id, user_id).await?;
    let created = size::create(db, store_id, &name, &value).await?;
    info!(size_id = %created.id, "size_created");
    Ok(created)
}

pub async fn update_size(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, id: Uuid, patch: SizePatch) -> Result<size::Model, ServiceError> {
    let name = patch.name.as_deref().map(validate_name).transpose()?;
    let value = patch.value.as_deref().map(validate_value).transpose()?;
    access::owned_store(db, store_id, user_id).await?;
    let mut am: size::ActiveModel = get_size(db, store_id, id).await?.into();
    if let Some(n) = name { am.name = Set(n); }
    if let Some(v) = value { am.value = Set(v); }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Delete a size; product variants using it go with it.
pub async fn delete_size(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, id: Uuid) -> Result<size::Model, ServiceError> {
    access::owned_store(db, store_id, user_id).await?;
    let found = get_size(db, store_id, id).await?;
    size::Entity::delete_by_id(id).exec(db).await?;
    info!(size_id = %id, "size_deleted");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_owner};

    #[tokio::test]
    async fn size_crud_service() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let (stranger, _) = seed_owner(&db, "stranger").await?;
        let m = create_size(&db, owner.id, shop.id, SizeInput { name: "Medium".into(), value: "M".into() }).await?;
        assert!(matches!(
            update_size(&db, stranger.id, shop.id, m.id, SizePatch { value: Some("L".into()), ..Default::default() }).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(create_size(&db, owner.id, shop.id, SizeInput { name: "".into(), value: "S".into() }).await.is_err());
        assert_eq!(get_size(&db, shop.id, m.id).await?.value, "M");
        Ok(())
    }
}
