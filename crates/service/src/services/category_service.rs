use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{billboard, category, product, service_offering, slug, subcategory};
use models::category::NewCategory;
use crate::access::{self, Lookup};
use crate::errors::ServiceError;
use crate::tree::{self, CategoryTree};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(default)]
    pub name: String,
    pub slug: Option<String>,
    pub parent_id: Option<Uuid>,
    pub billboard_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    pub parent_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    pub billboard_id: Option<Option<Uuid>>,
}

/// A category with the rows it points at and the rows directly under it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: category::Model,
    pub billboard: Option<billboard::Model>,
    pub parent: Option<category::Model>,
    pub children: Vec<category::Model>,
    pub subcategories: Vec<subcategory::Model>,
}

pub async fn list_categories(db: &DatabaseConnection, store_id: Uuid) -> Result<Vec<category::Model>, ServiceError> {
    access::find_store(db, store_id).await?;
    Ok(category::Entity::find()
        .filter(category::Column::StoreId.eq(store_id))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?)
}

/// The store's categories as a forest with their subcategories attached.
#[instrument(skip(db), fields(%store_id))]
pub async fn category_tree(db: &DatabaseConnection, store_id: Uuid) -> Result<CategoryTree, ServiceError> {
    let categories = list_categories(db, store_id).await?;
    let subcategories = subcategory::Entity::find()
        .filter(subcategory::Column::StoreId.eq(store_id))
        .all(db)
        .await?;
    let built = tree::build_tree(categories, subcategories);
    if !built.is_sound() {
        tracing::warn!(
            orphans = built.orphans.len(),
            cyclic = built.cyclic.len(),
            truncated = built.truncated.len(),
            "category_tree_inconsistent"
        );
    }
    Ok(built)
}

pub async fn get_category(db: &DatabaseConnection, store_id: Uuid, key: &Lookup) -> Result<CategoryDetail, ServiceError> {
    let found = access::scoped_lookup::<category::Entity, _>(
        db,
        category::Column::Id,
        category::Column::Slug,
        category::Column::StoreId,
        store_id,
        key,
    )
    .await?
    .ok_or_else(|| ServiceError::not_found("Category"))?;

    let billboard = match found.billboard_id {
        Some(id) => billboard::Entity::find_by_id(id).one(db).await?,
        None => None,
    };
    let parent = match found.parent_id {
        Some(id) => category::Entity::find_by_id(id).one(db).await?,
        None => None,
    };
    let children = category::Entity::find()
        .filter(category::Column::ParentId.eq(found.id))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?;
    let subcategories = subcategory::Entity::find()
        .filter(subcategory::Column::CategoryId.eq(found.id))
        .order_by_asc(subcategory::Column::Name)
        .all(db)
        .await?;
    Ok(CategoryDetail { category: found, billboard, parent, children, subcategories })
}

async fn store_categories(db: &DatabaseConnection, store_id: Uuid) -> Result<Vec<category::Model>, ServiceError> {
    Ok(category::Entity::find().filter(category::Column::StoreId.eq(store_id)).all(db).await?)
}

#[instrument(skip(db, input), fields(%store_id))]
pub async fn create_category(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, input: CategoryInput) -> Result<category::Model, ServiceError> {
    let name = category::validate_name(&input.name)?;
    let slug = slug::resolve_slug(input.slug.as_deref(), &name)?;
    access::owned_store(db, store_id, user_id).await?;

    if let Some(b) = input.billboard_id {
        access::billboard_in_store(db, store_id, b).await?;
    }
    if let Some(p) = input.parent_id {
        tree::validate_parent(&store_categories(db, store_id).await?, None, p)?;
    }
    access::ensure_slug_free::<category::Entity, _>(
        db,
        category::Column::Id,
        category::Column::Slug,
        category::Column::StoreId,
        store_id,
        &slug,
        None,
    )
    .await?;

    let created = category::create(
        db,
        NewCategory { store_id, parent_id: input.parent_id, billboard_id: input.billboard_id, name, slug: Some(slug) },
    )
    .await?;
    info!(category_id = %created.id, "category_created");
    Ok(created)
}

#[instrument(skip(db, patch), fields(%store_id, %id))]
pub async fn update_category(
    db: &DatabaseConnection,
    user_id: Uuid,
    store_id: Uuid,
    id: Uuid,
    patch: CategoryPatch,
) -> Result<category::Model, ServiceError> {
    let name = patch.name.as_deref().map(category::validate_name).transpose()?;
    let explicit_slug = patch.slug.as_deref().map(|s| slug::resolve_slug(Some(s), s)).transpose()?;
    access::owned_store(db, store_id, user_id).await?;

    let all = store_categories(db, store_id).await?;
    let current = all
        .iter()
        .find(|c| c.id == id)
        .cloned()
        .ok_or_else(|| ServiceError::not_found("Category"))?;

    if let Some(Some(b)) = patch.billboard_id {
        access::billboard_in_store(db, store_id, b).await?;
    }
    if let Some(Some(p)) = patch.parent_id {
        tree::validate_parent(&all, Some(id), p)?;
    }
    if let Some(s) = &explicit_slug {
        access::ensure_slug_free::<category::Entity, _>(
            db,
            category::Column::Id,
            category::Column::Slug,
            category::Column::StoreId,
            store_id,
            s,
            Some(id),
        )
        .await?;
    }

    let mut am: category::ActiveModel = current.into();
    if let Some(n) = name { am.name = Set(n); }
    if let Some(s) = explicit_slug { am.slug = Set(s); }
    if let Some(p) = patch.parent_id { am.parent_id = Set(p); }
    if let Some(b) = patch.billboard_id { am.billboard_id = Set(b); }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Delete a category that nothing hangs off anymore.
#[instrument(skip(db), fields(%store_id, %id))]
pub async fn delete_category(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, id: Uuid) -> Result<category::Model, ServiceError> {
    access::owned_store(db, store_id, user_id).await?;
    let txn = db.begin().await?;
    let found = access::scoped::<category::Entity, _>(&txn, category::Column::Id, category::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Category"))?;

    let children = category::Entity::find().filter(category::Column::ParentId.eq(id)).count(&txn).await?;
    let subs = subcategory::Entity::find().filter(subcategory::Column::CategoryId.eq(id)).count(&txn).await?;
    let products = product::Entity::find().filter(product::Column::CategoryId.eq(id)).count(&txn).await?;
    let services = service_offering::Entity::find().filter(service_offering::Column::CategoryId.eq(id)).count(&txn).await?;
    if children + subs + products + services > 0 {
        return Err(ServiceError::conflict(format!(
            "Category has dependents: {children} categories, {subs} subcategories, {products} products, {services} services"
        )));
    }
    category::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!("category_deleted");
    Ok(found)
}
