use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use serde::Deserialize;
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{billboard, image, news, order, product, service_offering, store, subcategory, category};
use crate::access;
use crate::errors::ServiceError;
use crate::storage::{cleanup_blobs, ObjectStore};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInput {
    #[serde(default)]
    pub name: String,
}

/// Create a store owned by `user_id`.
#[instrument(skip(db, input), fields(%user_id))]
pub async fn create_store(db: &DatabaseConnection, user_id: Uuid, input: StoreInput) -> Result<store::Model, ServiceError> {
    let created = store::create(db, user_id, &input.name).await?;
    info!(store_id = %created.id, "store_created");
    Ok(created)
}

/// Stores owned by `user_id`, oldest first.
pub async fn list_stores(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<store::Model>, ServiceError> {
    Ok(store::Entity::find()
        .filter(store::Column::UserId.eq(user_id))
        .order_by_asc(store::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn get_store(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid) -> Result<store::Model, ServiceError> {
    access::owned_store(db, store_id, user_id).await
}

/// Rename a store (the only store setting).
pub async fn update_store(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, input: StoreInput) -> Result<store::Model, ServiceError> {
    let name = store::validate_name(&input.name)?;
    let mut am: store::ActiveModel = access::owned_store(db, store_id, user_id).await?.into();
    am.name = Set(name);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Delete a store with everything in it, then remove its blobs.
#[instrument(skip(db, objects), fields(%store_id))]
pub async fn delete_store(db: &DatabaseConnection, objects: &dyn ObjectStore, user_id: Uuid, store_id: Uuid) -> Result<store::Model, ServiceError> {
    let found = access::owned_store(db, store_id, user_id).await?;

    let txn = db.begin().await?;
    let mut urls: Vec<String> = billboard::Entity::find()
        .filter(billboard::Column::StoreId.eq(store_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|b| b.image_url)
        .collect();
    urls.extend(
        news::Entity::find()
            .filter(news::Column::StoreId.eq(store_id))
            .all(&txn)
            .await?
            .into_iter()
            .filter_map(|n| n.image_url),
    );
    let product_ids: Vec<Uuid> = product::Entity::find()
        .filter(product::Column::StoreId.eq(store_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();
    let service_ids: Vec<Uuid> = service_offering::Entity::find()
        .filter(service_offering::Column::StoreId.eq(store_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();
    urls.extend(
        image::Entity::find()
            .filter(
                image::Column::ProductId
                    .is_in(product_ids)
                    .or(image::Column::ServiceId.is_in(service_ids)),
            )
            .all(&txn)
            .await?
            .into_iter()
            .map(|i| i.url),
    );

    // children that hold restricting references go first
    order::Entity::delete_many().filter(order::Column::StoreId.eq(store_id)).exec(&txn).await?;
    product::Entity::delete_many().filter(product::Column::StoreId.eq(store_id)).exec(&txn).await?;
    service_offering::Entity::delete_many().filter(service_offering::Column::StoreId.eq(store_id)).exec(&txn).await?;
    subcategory::Entity::delete_many().filter(subcategory::Column::StoreId.eq(store_id)).exec(&txn).await?;
    category::Entity::delete_many().filter(category::Column::StoreId.eq(store_id)).exec(&txn).await?;
    store::Entity::delete_by_id(store_id).exec(&txn).await?;
    txn.commit().await?;

    let failed = cleanup_blobs(objects, &urls).await;
    info!(blobs = urls.len(), failed, "store_deleted");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::mock::RecordingObjectStore;
    use crate::test_support::{get_db, seed_owner};

    #[tokio::test]
    async fn store_crud_service() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, _) = seed_owner(&db, "owner").await?;

        let s = create_store(&db, owner.id, StoreInput { name: "Second".into() }).await?;
        assert_eq!(list_stores(&db, owner.id).await?.len(), 2);

        let renamed = update_store(&db, owner.id, s.id, StoreInput { name: "Renamed".into() }).await?;
        assert_eq!(renamed.name, "Renamed");
        assert!(matches!(
            update_store(&db, owner.id, s.id, StoreInput { name: " ".into() }).await,
            Err(ServiceError::Model(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn delete_store_removes_rows_and_blobs() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let (stranger, _) = seed_owner(&db, "stranger").await?;
        billboard::create(&db, shop.id, "Hero", "/uploads/hero.png", false).await?;
        let objects = RecordingObjectStore::default();

        assert!(matches!(delete_store(&db, &objects, stranger.id, shop.id).await, Err(ServiceError::Forbidden(_))));
        delete_store(&db, &objects, owner.id, shop.id).await?;
        assert!(store::Entity::find_by_id(shop.id).one(&db).await?.is_none());
        assert_eq!(objects.deleted(), vec!["/uploads/hero.png"]);
        Ok(())
    }
}
