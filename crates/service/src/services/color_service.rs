use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{color, validate};
use crate::access;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorPatch {
    pub name: Option<String>,
    pub value: Option<String>,
}

fn validate_name(name: &str) -> Result<String, ServiceError> {
    Ok(validate::required_text("Name", name, 64)?)
}

fn validate_value(value: &str) -> Result<String, ServiceError> {
    Ok(color::validate_value(value)?)
}

pub async fn list_colors(db: &DatabaseConnection, store_id: Uuid) -> Result<Vec<color::Model>, ServiceError> {
    access::find_store(db, store_id).await?;
    Ok(color::Entity::find()
        .filter(color::Column::StoreId.eq(store_id))
        .order_by_asc(color::Column::Name)
        .all(db)
        .await?)
}

pub async fn get_color(db: &DatabaseConnection, store_id: Uuid, id: Uuid) -> Result<color::Model, ServiceError> {
    access::scoped::<color::Entity, _>(db, color::Column::Id, color::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Color"))
}

#[instrument(skip(db, input), fields(%store_id))]
pub async fn create_color(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, input: ColorInput) -> Result<color::Model, ServiceError> {
    let name = validate_name(&input.name)?;
    let value = validate_value(&input.value)?;
    access::owned_store(db, store_id, user_id).await?;
    let created = color::create(db, store_id, &name, &value).await?;
    info!(color_id = %created.id, "color_created");
    Ok(created)
}

pub async fn update_color(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, id: Uuid, patch: ColorPatch) -> Result<color::Model, ServiceError> {
    let name = patch.name.as_deref().map(validate_name).transpose()?;
    let value = patch.value.as_deref().map(validate_value).transpose()?;
    access::owned_store(db, store_id, user_id).await?;
    let mut am: color::ActiveModel = get_color(db, store_id, id).await?.into();
    if let Some(n) = name { am.name = Set(n); }
    if let Some(v) = value { am.value = Set(v); }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Delete a color; product variants using it go with it.
pub async fn delete_color(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, id: Uuid) -> Result<color::Model, ServiceError> {
    access::owned_store(db, store_id, user_id).await?;
    let found = get_color(db, store_id, id).await?;
    color::Entity::delete_by_id(id).exec(db).await?;
    info!(color_id = %id, "color_deleted");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_owner};

    #[tokio::test]
    async fn color_crud_service() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let red = create_color(&db, owner.id, shop.id, ColorInput { name: "Red".into(), value: "#FF0000".into() }).await?;
        assert_eq!(red.value, "#ff0000");
        assert!(create_color(&db, owner.id, shop.id, ColorInput { name: "Bad".into(), value: "red".into() }).await.is_err());

        let updated = update_color(&db, owner.id, shop.id, red.id, ColorPatch { value: Some("#f00".into()), ..Default::default() }).await?;
        assert_eq!(updated.value, "#f00");
        assert_eq!(list_colors(&db, shop.id).await?.len(), 1);
        delete_color(&db, owner.id, shop.id, red.id).await?;
        assert!(matches!(get_color(&db, shop.id, red.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
