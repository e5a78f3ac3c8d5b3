//! Bookable services. Same catalog rules as products, without stock or variants.

use std::collections::{HashMap, HashSet};

use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use models::image::Owner;
use models::service_offering::{self, NewService};
use models::{category, image, slug, subcategory, validate};
use crate::access::{self, Lookup};
use crate::errors::ServiceError;
use crate::storage::{cleanup_blobs, ObjectStore};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingInput {
    #[serde(default)]
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price_cents: Option<i64>,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category_id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    pub subcategory_id: Option<Option<Uuid>>,
    pub is_featured: Option<bool>,
    pub is_archived: Option<bool>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct OfferingFilter {
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub is_featured: Option<bool>,
    pub include_archived: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingView {
    #[serde(flatten)]
    pub service: service_offering::Model,
    pub images: Vec<image::Model>,
    pub category: Option<category::Model>,
    pub subcategory: Option<subcategory::Model>,
}

fn clean_images(urls: &[String]) -> Result<Vec<String>, ServiceError> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for u in urls {
        let u = validate::image_url("Image URL", u)?;
        if seen.insert(u.clone()) {
            out.push(u);
        }
    }
    Ok(out)
}

async fn hydrate<C: ConnectionTrait>(db: &C, rows: Vec<service_offering::Model>) -> Result<Vec<OfferingView>, ServiceError> {
    let ids: Vec<Uuid> = rows.iter().map(|s| s.id).collect();
    let mut images: HashMap<Uuid, Vec<image::Model>> = HashMap::new();
    for img in image::Entity::find()
        .filter(image::Column::ServiceId.is_in(ids))
        .order_by_asc(image::Column::CreatedAt)
        .all(db)
        .await?
    {
        if let Some(sid) = img.service_id {
            images.entry(sid).or_default().push(img);
        }
    }
    let categories: HashMap<Uuid, category::Model> = category::Entity::find()
        .filter(category::Column::Id.is_in(rows.iter().map(|s| s.category_id).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let subcategories: HashMap<Uuid, subcategory::Model> = subcategory::Entity::find()
        .filter(subcategory::Column::Id.is_in(rows.iter().filter_map(|s| s.subcategory_id).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    Ok(rows
        .into_iter()
        .map(|s| OfferingView {
            images: images.remove(&s.id).unwrap_or_default(),
            category: categories.get(&s.category_id).cloned(),
            subcategory: s.subcategory_id.and_then(|id| subcategories.get(&id).cloned()),
            service: s,
        })
        .collect())
}

async fn replace_images<C: ConnectionTrait>(db: &C, service_id: Uuid, urls: &[String]) -> Result<(), ServiceError> {
    image::Entity::delete_many().filter(image::Column::ServiceId.eq(service_id)).exec(db).await?;
    for u in urls {
        image::create(db, Owner::Service(service_id), u).await?;
    }
    Ok(())
}

pub async fn list_offerings(db: &DatabaseConnection, store_id: Uuid, filter: OfferingFilter) -> Result<Vec<OfferingView>, ServiceError> {
    access::find_store(db, store_id).await?;
    let mut q = service_offering::Entity::find().filter(service_offering::Column::StoreId.eq(store_id));
    if !filter.include_archived {
        q = q.filter(service_offering::Column::IsArchived.eq(false));
    }
    if let Some(c) = filter.category_id {
        q = q.filter(service_offering::Column::CategoryId.eq(c));
    }
    if let Some(s) = filter.subcategory_id {
        q = q.filter(service_offering::Column::SubcategoryId.eq(s));
    }
    if let Some(f) = filter.is_featured {
        q = q.filter(service_offering::Column::IsFeatured.eq(f));
    }
    let rows = q.order_by_desc(service_offering::Column::CreatedAt).all(db).await?;
    hydrate(db, rows).await
}

pub async fn get_offering(db: &DatabaseConnection, store_id: Uuid, key: &Lookup, include_archived: bool) -> Result<OfferingView, ServiceError> {
    let found = access::scoped_lookup::<service_offering::Entity, _>(
        db,
        service_offering::Column::Id,
        service_offering::Column::Slug,
        service_offering::Column::StoreId,
        store_id,
        key,
    )
    .await?
    .filter(|s| include_archived || !s.is_archived)
    .ok_or_else(|| ServiceError::not_found("Service"))?;
    hydrate(db, vec![found]).await?.pop().ok_or_else(|| ServiceError::not_found("Service"))
}

#[instrument(skip(db, input), fields(%store_id))]
pub async fn create_offering(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, input: OfferingInput) -> Result<OfferingView, ServiceError> {
    let name = validate::required_text("Name", &input.name, 160)?;
    let price_cents = input.price_cents.ok_or_else(|| ServiceError::invalid("Price is required"))?;
    let category_id = input.category_id.ok_or_else(|| ServiceError::invalid("Category id is required"))?;
    validate::non_negative("Price", price_cents)?;
    let slug = slug::resolve_slug(input.slug.as_deref(), &name)?;
    let images = clean_images(&input.images)?;
    access::owned_store(db, store_id, user_id).await?;

    let txn = db.begin().await?;
    access::category_in_store(&txn, store_id, category_id).await?;
    if let Some(s) = input.subcategory_id {
        access::subcategory_in_category(&txn, store_id, category_id, s).await?;
    }
    access::ensure_slug_free::<service_offering::Entity, _>(
        &txn,
        service_offering::Column::Id,
        service_offering::Column::Slug,
        service_offering::Column::StoreId,
        store_id,
        &slug,
        None,
    )
    .await?;
    let created = service_offering::create(
        &txn,
        NewService {
            store_id,
            category_id,
            subcategory_id: input.subcategory_id,
            name,
            slug: Some(slug),
            description: input.description,
            price_cents,
            is_featured: input.is_featured,
            is_archived: input.is_archived,
        },
    )
    .await?;
    replace_images(&txn, created.id, &images).await?;
    let view = hydrate(&txn, vec![created]).await?.pop().ok_or_else(|| ServiceError::not_found("Service"))?;
    txn.commit().await?;
    info!(service_id = %view.service.id, "service_created");
    Ok(view)
}

#[instrument(skip(db, objects, patch), fields(%store_id, %id))]
pub async fn update_offering(
    db: &DatabaseConnection,
    objects: &dyn ObjectStore,
    user_id: Uuid,
    store_id: Uuid,
    id: Uuid,
    patch: OfferingPatch,
) -> Result<OfferingView, ServiceError> {
    let name = patch.name.as_deref().map(|n| validate::required_text("Name", n, 160)).transpose()?;
    let explicit_slug = patch.slug.as_deref().map(|s| slug::resolve_slug(Some(s), s)).transpose()?;
    let images = patch.images.as_deref().map(clean_images).transpose()?;
    if let Some(p) = patch.price_cents {
        validate::non_negative("Price", p)?;
    }
    access::owned_store(db, store_id, user_id).await?;

    let txn = db.begin().await?;
    let current = access::scoped::<service_offering::Entity, _>(
        &txn,
        service_offering::Column::Id,
        service_offering::Column::StoreId,
        store_id,
        id,
    )
    .await?
    .ok_or_else(|| ServiceError::not_found("Service"))?;

    let category_id = patch.category_id.unwrap_or(current.category_id);
    let subcategory_id = match patch.subcategory_id {
        Some(s) => s,
        None if category_id != current.category_id => None,
        None => current.subcategory_id,
    };
    access::category_in_store(&txn, store_id, category_id).await?;
    if let Some(s) = subcategory_id {
        access::subcategory_in_category(&txn, store_id, category_id, s).await?;
    }
    if let Some(s) = &explicit_slug {
        access::ensure_slug_free::<service_offering::Entity, _>(
            &txn,
            service_offering::Column::Id,
            service_offering::Column::Slug,
            service_offering::Column::StoreId,
            store_id,
            s,
            Some(id),
        )
        .await?;
    }

    let mut removed = Vec::new();
    if let Some(new_urls) = &images {
        let keep: HashSet<&String> = new_urls.iter().collect();
        removed = image::find_by_owner(&txn, Owner::Service(id))
            .await?
            .into_iter()
            .map(|i| i.url)
            .filter(|u| !keep.contains(u))
            .collect();
        replace_images(&txn, id, new_urls).await?;
    }

    let mut am: service_offering::ActiveModel = current.into();
    if let Some(n) = name { am.name = Set(n); }
    if let Some(s) = explicit_slug { am.slug = Set(s); }
    if let Some(d) = patch.description { am.description = Set(d.trim().to_string()); }
    if let Some(p) = patch.price_cents { am.price_cents = Set(p); }
    if let Some(f) = patch.is_featured { am.is_featured = Set(f); }
    if let Some(a) = patch.is_archived { am.is_archived = Set(a); }
    am.category_id = Set(category_id);
    am.subcategory_id = Set(subcategory_id);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;
    let view = hydrate(&txn, vec![updated]).await?.pop().ok_or_else(|| ServiceError::not_found("Service"))?;
    txn.commit().await?;

    if !removed.is_empty() {
        cleanup_blobs(objects, &removed).await;
    }
    Ok(view)
}

#[instrument(skip(db, objects), fields(%store_id, %id))]
pub async fn delete_offering(
    db: &DatabaseConnection,
    objects: &dyn ObjectStore,
    user_id: Uuid,
    store_id: Uuid,
    id: Uuid,
) -> Result<service_offering::Model, ServiceError> {
    access::owned_store(db, store_id, user_id).await?;
    let txn = db.begin().await?;
    let found = access::scoped::<service_offering::Entity, _>(
        &txn,
        service_offering::Column::Id,
        service_offering::Column::StoreId,
        store_id,
        id,
    )
    .await?
    .ok_or_else(|| ServiceError::not_found("Service"))?;
    let urls: Vec<String> = image::find_by_owner(&txn, Owner::Service(id)).await?.into_iter().map(|i| i.url).collect();
    image::Entity::delete_many().filter(image::Column::ServiceId.eq(id)).exec(&txn).await?;
    service_offering::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    let failed = cleanup_blobs(objects, &urls).await;
    info!(images = urls.len(), failed, "service_deleted");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::product_service::tests::category;
    use crate::storage::mock::RecordingObjectStore;
    use crate::test_support::{get_db, seed_owner};

    fn input(name: &str, category_id: Uuid) -> OfferingInput {
        OfferingInput {
            name: name.into(),
            slug: None,
            description: "An hour with a stylist".into(),
            price_cents: Some(4500),
            category_id: Some(category_id),
            subcategory_id: None,
            is_featured: false,
            is_archived: false,
            images: vec![],
        }
    }

    #[tokio::test]
    async fn images_are_optional_and_slug_is_derived() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let hair = category(&db, owner.id, shop.id, "Hair").await?;
        let cut = create_offering(&db, owner.id, shop.id, input("Hair Cut", hair.id)).await?;
        assert!(cut.images.is_empty());
        assert_eq!(cut.service.slug, "hair-cut");
        assert_eq!(cut.category.map(|c| c.id), Some(hair.id));

        let dup = create_offering(&db, owner.id, shop.id, input("Hair cut", hair.id)).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn filters_and_archive() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let hair = category(&db, owner.id, shop.id, "Hair").await?;
        let nails = category(&db, owner.id, shop.id, "Nails").await?;
        let cut = create_offering(&db, owner.id, shop.id, input("Cut", hair.id)).await?;
        create_offering(&db, owner.id, shop.id, input("Polish", nails.id)).await?;

        let only_hair = list_offerings(&db, shop.id, OfferingFilter { category_id: Some(hair.id), ..Default::default() }).await?;
        assert_eq!(only_hair.len(), 1);

        let objects = RecordingObjectStore::default();
        let patch = OfferingPatch { is_archived: Some(true), ..Default::default() };
        update_offering(&db, &objects, owner.id, shop.id, cut.service.id, patch).await?;
        assert_eq!(list_offerings(&db, shop.id, OfferingFilter::default()).await?.len(), 1);
        assert!(get_offering(&db, shop.id, &Lookup::parse("cut"), false).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_images() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let hair = category(&db, owner.id, shop.id, "Hair").await?;
        let mut with_image = input("Colouring", hair.id);
        with_image.images = vec!["/uploads/colour.png".into()];
        let svc = create_offering(&db, owner.id, shop.id, with_image).await?;

        let objects = RecordingObjectStore::default();
        let (stranger, _) = seed_owner(&db, "stranger").await?;
        let denied = delete_offering(&db, &objects, stranger.id, shop.id, svc.service.id).await;
        assert!(matches!(denied, Err(ServiceError::Forbidden(_))));

        delete_offering(&db, &objects, owner.id, shop.id, svc.service.id).await?;
        assert_eq!(objects.deleted(), vec!["/uploads/colour.png"]);
        Ok(())
    }
}
