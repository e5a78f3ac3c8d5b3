use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{billboard, category, product, service_offering, slug, subcategory, validate};
use models::subcategory::NewSubcategory;
use crate::access::{self, Lookup};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryInput {
    #[serde(default)]
    pub name: String,
    pub slug: Option<String>,
    pub category_id: Option<Uuid>,
    pub billboard_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    pub billboard_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryDetail {
    #[serde(flatten)]
    pub subcategory: subcategory::Model,
    pub category: Option<category::Model>,
    pub billboard: Option<billboard::Model>,
}

fn validate_name(name: &str) -> Result<String, ServiceError> {
    Ok(validate::required_text("Name", name, 128)?)
}

pub async fn list_subcategories(db: &DatabaseConnection, store_id: Uuid, category_id: Option<Uuid>) -> Result<Vec<subcategory::Model>, ServiceError> {
    access::find_store(db, store_id).await?;
    let mut q = subcategory::Entity::find().filter(subcategory::Column::StoreId.eq(store_id));
    if let Some(c) = category_id {
        q = q.filter(subcategory::Column::CategoryId.eq(c));
    }
    Ok(q.order_by_asc(subcategory::Column::Name).all(db).await?)
}

pub async fn get_subcategory(db: &DatabaseConnection, store_id: Uuid, key: &Lookup) -> Result<SubcategoryDetail, ServiceError> {
    let found = access::scoped_lookup::<subcategory::Entity, _>(
        db,
        subcategory::Column::Id,
        subcategory::Column::Slug,
        subcategory::Column::StoreId,
        store_id,
        key,
    )
    .await?
    .ok_or_else(|| ServiceError::not_found("Subcategory"))?;
    let category = category::Entity::find_by_id(found.category_id).one(db).await?;
    let billboard = match found.billboard_id {
        Some(id) => billboard::Entity::find_by_id(id).one(db).await?,
        None => None,
    };
    Ok(SubcategoryDetail { subcategory: found, category, billboard })
}

#[instrument(skip(db, input), fields(%store_id))]
pub async fn create_subcategory(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, input: SubcategoryInput) -> Result<subcategory::Model, ServiceError> {
    let name = validate_name(&input.name)?;
    let category_id = input.category_id.ok_or_else(|| ServiceError::invalid("Category id is required"))?;
    let slug = slug::resolve_slug(input.slug.as_deref(), &name)?;
    access::owned_store(db, store_id, user_id).await?;

    access::category_in_store(db, store_id, category_id).await?;
    if let Some(b) = input.billboard_id {
        access::billboard_in_store(db, store_id, b).await?;
    }
    access::ensure_slug_free::<subcategory::Entity, _>(
        db,
        subcategory::Column::Id,
        subcategory::Column::Slug,
        subcategory::Column::StoreId,
        store_id,
        &slug,
        None,
    )
    .await?;

    let created = subcategory::create(
        db,
        NewSubcategory { store_id, category_id, billboard_id: input.billboard_id, name, slug: Some(slug) },
    )
    .await?;
    info!(subcategory_id = %created.id, "subcategory_created");
    Ok(created)
}

#[instrument(skip(db, patch), fields(%store_id, %id))]
pub async fn update_subcategory(
    db: &DatabaseConnection,
    user_id: Uuid,
    store_id: Uuid,
    id: Uuid,
    patch: SubcategoryPatch,
) -> Result<subcategory::Model, ServiceError> {
    let name = patch.name.as_deref().map(validate_name).transpose()?;
    let explicit_slug = patch.slug.as_deref().map(|s| slug::resolve_slug(Some(s), s)).transpose()?;
    access::owned_store(db, store_id, user_id).await?;

    let txn = db.begin().await?;
    let current = access::scoped::<subcategory::Entity, _>(&txn, subcategory::Column::Id, subcategory::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Subcategory"))?;

    if let Some(c) = patch.category_id.filter(|c| *c != current.category_id) {
        access::category_in_store(&txn, store_id, c).await?;
        // products and services pair a subcategory with its category
        let moved_products = product::Entity::find()
            .filter(product::Column::SubcategoryId.eq(id))
            .filter(product::Column::CategoryId.ne(c))
            .count(&txn)
            .await?;
        let moved_services = service_offering::Entity::find()
            .filter(service_offering::Column::SubcategoryId.eq(id))
            .filter(service_offering::Column::CategoryId.ne(c))
            .count(&txn)
            .await?;
        if moved_products + moved_services > 0 {
            return Err(ServiceError::conflict("Subcategory is used by products or services of its current category"));
        }
    }
    if let Some(Some(b)) = patch.billboard_id {
        access::billboard_in_store(&txn, store_id, b).await?;
    }
    if let Some(s) = &explicit_slug {
        access::ensure_slug_free::<subcategory::Entity, _>(
            &txn,
            subcategory::Column::Id,
            subcategory::Column::Slug,
            subcategory::Column::StoreId,
            store_id,
            s,
            Some(id),
        )
        .await?;
    }

    let mut am: subcategory::ActiveModel = current.into();
    if let Some(n) = name { am.name = Set(n); }
    if let Some(s) = explicit_slug { am.slug = Set(s); }
    if let Some(c) = patch.category_id { am.category_id = Set(c); }
    if let Some(b) = patch.billboard_id { am.billboard_id = Set(b); }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

#[instrument(skip(db), fields(%store_id, %id))]
pub async fn delete_subcategory(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, id: Uuid) -> Result<subcategory::Model, ServiceError> {
    access::owned_store(db, store_id, user_id).await?;
    let txn = db.begin().await?;
    let found = access::scoped::<subcategory::Entity, _>(&txn, subcategory::Column::Id, subcategory::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Subcategory"))?;
    let products = product::Entity::find().filter(product::Column::SubcategoryId.eq(id)).count(&txn).await?;
    let services = service_offering::Entity::find().filter(service_offering::Column::SubcategoryId.eq(id)).count(&txn).await?;
    if products + services > 0 {
        return Err(ServiceError::conflict(format!(
            "Subcategory has dependents: {products} products, {services} services"
        )));
    }
    subcategory::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!("subcategory_deleted");
    Ok(found)
}
