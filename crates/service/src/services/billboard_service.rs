use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use serde::Deserialize;
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use models::billboard;
use crate::access;
use crate::errors::ServiceError;
use crate::storage::{cleanup_blobs, ObjectStore};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillboardInput {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub is_banner: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillboardPatch {
    pub label: Option<String>,
    pub image_url: Option<String>,
    pub is_banner: Option<bool>,
}

/// Billboards of a store, newest first. `banner_only` keeps the site-wide banners.
pub async fn list_billboards(db: &DatabaseConnection, store_id: Uuid, banner_only: bool) -> Result<Vec<billboard::Model>, ServiceError> {
    access::find_store(db, store_id).await?;
    let mut q = billboard::Entity::find().filter(billboard::Column::StoreId.eq(store_id));
    if banner_only {
        q = q.filter(billboard::Column::IsBanner.eq(true));
    }
    Ok(q.order_by_desc(billboard::Column::CreatedAt).all(db).await?)
}

pub async fn get_billboard(db: &DatabaseConnection, store_id: Uuid, id: Uuid) -> Result<billboard::Model, ServiceError> {
    access::scoped::<billboard::Entity, _>(db, billboard::Column::Id, billboard::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Billboard"))
}

#[instrument(skip(db, input), fields(%store_id))]
pub async fn create_billboard(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, input: BillboardInput) -> Result<billboard::Model, ServiceError> {
    let label = billboard::validate_label(&input.label)?;
    let image_url = billboard::validate_image_url(&input.image_url)?;
    access::owned_store(db, store_id, user_id).await?;
    let created = billboard::create(db, store_id, &label, &image_url, input.is_banner).await?;
    info!(billboard_id = %created.id, "billboard_created");
    Ok(created)
}

/// Update a billboard. A replaced image is removed from storage after the write.
pub async fn update_billboard(
    db: &DatabaseConnection,
    objects: &dyn ObjectStore,
    user_id: Uuid,
    store_id: Uuid,
    id: Uuid,
    patch: BillboardPatch,
) -> Result<billboard::Model, ServiceError> {
    let label = patch.label.as_deref().map(billboard::validate_label).transpose()?;
    let image_url = patch.image_url.as_deref().map(billboard::validate_image_url).transpose()?;
    access::owned_store(db, store_id, user_id).await?;
    let current = get_billboard(db, store_id, id).await?;

    let replaced = image_url.as_ref().filter(|u| **u != current.image_url).map(|_| current.image_url.clone());
    let mut am: billboard::ActiveModel = current.into();
    if let Some(l) = label { am.label = Set(l); }
    if let Some(u) = image_url { am.image_url = Set(u); }
    if let Some(b) = patch.is_banner { am.is_banner = Set(b); }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;

    if let Some(old) = replaced {
        cleanup_blobs(objects, &[old]).await;
    }
    Ok(updated)
}

/// Delete a billboard row, then its image blob.
#[instrument(skip(db, objects), fields(%store_id, %id))]
pub async fn delete_billboard(db: &DatabaseConnection, objects: &dyn ObjectStore, user_id: Uuid, store_id: Uuid, id: Uuid) -> Result<billboard::Model, ServiceError> {
    access::owned_store(db, store_id, user_id).await?;
    let txn = db.begin().await?;
    let found = access::scoped::<billboard::Entity, _>(&txn, billboard::Column::Id, billboard::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Billboard"))?;
    billboard::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    cleanup_blobs(objects, &[found.image_url.clone()]).await;
    info!("billboard_deleted");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::mock::RecordingObjectStore;
    use crate::test_support::{get_db, seed_owner};

    fn input(label: &str, url: &str, is_banner: bool) -> BillboardInput {
        BillboardInput { label: label.into(), image_url: url.into(), is_banner }
    }

    #[tokio::test]
    async fn billboard_crud_and_banner_filter() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let hero = create_billboard(&db, owner.id, shop.id, input("Hero", "/uploads/hero.png", false)).await?;
        create_billboard(&db, owner.id, shop.id, input("Sale", "/uploads/sale.png", true)).await?;

        assert_eq!(list_billboards(&db, shop.id, false).await?.len(), 2);
        let banners = list_billboards(&db, shop.id, true).await?;
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].label, "Sale");

        let objects = RecordingObjectStore::default();
        let patch = BillboardPatch { image_url: Some("/uploads/hero-v2.png".into()), ..Default::default() };
        let updated = update_billboard(&db, &objects, owner.id, shop.id, hero.id, patch).await?;
        assert_eq!(updated.image_url, "/uploads/hero-v2.png");
        assert_eq!(objects.deleted(), vec!["/uploads/hero.png"]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_fields_rejected_before_ownership() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, shop) = seed_owner(&db, "owner").await?;
        let (stranger, _) = seed_owner(&db, "stranger").await?;
        let err = create_billboard(&db, stranger.id, shop.id, input("Hero", "", false)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Model(_)));
        let err = create_billboard(&db, stranger.id, shop.id, input("Hero", "/uploads/x.png", false)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        Ok(())
    }

    #[tokio::test]
    async fn delete_commits_then_removes_blob_even_if_it_fails() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let b = create_billboard(&db, owner.id, shop.id, input("Hero", "/uploads/hero.png", false)).await?;
        let objects = RecordingObjectStore::default();
        objects.fail_on("/uploads/hero.png");

        delete_billboard(&db, &objects, owner.id, shop.id, b.id).await?;
        assert!(billboard::Entity::find_by_id(b.id).one(&db).await?.is_none());
        assert!(matches!(get_billboard(&db, shop.id, b.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
