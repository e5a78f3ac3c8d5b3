//! Store scoping: ownership checks and "does this reference belong to the
//! same store" lookups shared by every catalog service.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::warn;
use uuid::Uuid;

use models::{billboard, category, color, product, size, store, subcategory};

use crate::errors::ServiceError;

/// Path segment that is either a uuid or a slug.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Lookup {
    Id(Uuid),
    Slug(String),
}

impl Lookup {
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(id) => Lookup::Id(id),
            Err(_) => Lookup::Slug(raw.to_ascii_lowercase()),
        }
    }
}

/// Store must exist; used by the public storefront reads.
pub async fn find_store<C: ConnectionTrait>(db: &C, store_id: Uuid) -> Result<store::Model, ServiceError> {
    store::Entity::find_by_id(store_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Store"))
}

/// Store must exist and belong to `user_id`.
pub async fn owned_store<C: ConnectionTrait>(db: &C, store_id: Uuid, user_id: Uuid) -> Result<store::Model, ServiceError> {
    let s = find_store(db, store_id).await?;
    if s.user_id != user_id {
        warn!(%store_id, %user_id, "store access denied");
        return Err(ServiceError::Forbidden("Unauthorized".into()));
    }
    Ok(s)
}

/// Row of `E` with the given id inside the store, if any.
pub(crate) async fn scoped<E, C>(
    db: &C,
    id_col: E::Column,
    store_col: E::Column,
    store_id: Uuid,
    id: Uuid,
) -> Result<Option<E::Model>, ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    Ok(E::find().filter(id_col.eq(id)).filter(store_col.eq(store_id)).one(db).await?)
}

/// Row of `E` matched by id or slug inside the store, if any.
pub(crate) async fn scoped_lookup<E, C>(
    db: &C,
    id_col: E::Column,
    slug_col: E::Column,
    store_col: E::Column,
    store_id: Uuid,
    key: &Lookup,
) -> Result<Option<E::Model>, ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let q = E::find().filter(store_col.eq(store_id));
    let q = match key {
        Lookup::Id(id) => q.filter(id_col.eq(*id)),
        Lookup::Slug(slug) => q.filter(slug_col.eq(slug.as_str())),
    };
    Ok(q.one(db).await?)
}

/// Whether another row of `E` in the store already uses `slug`.
pub(crate) async fn slug_taken<E, C>(
    db: &C,
    id_col: E::Column,
    slug_col: E::Column,
    store_col: E::Column,
    store_id: Uuid,
    slug: &str,
    exclude: Option<Uuid>,
) -> Result<bool, ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut q = E::find().filter(store_col.eq(store_id)).filter(slug_col.eq(slug));
    if let Some(id) = exclude {
        q = q.filter(id_col.ne(id));
    }
    Ok(q.one(db).await?.is_some())
}

pub(crate) async fn ensure_slug_free<E, C>(
    db: &C,
    id_col: E::Column,
    slug_col: E::Column,
    store_col: E::Column,
    store_id: Uuid,
    slug: &str,
    exclude: Option<Uuid>,
) -> Result<(), ServiceError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if slug_taken::<E, C>(db, id_col, slug_col, store_col, store_id, slug, exclude).await? {
        return Err(ServiceError::conflict(format!("Slug \"{slug}\" is already used in this store")));
    }
    Ok(())
}

pub async fn billboard_in_store<C: ConnectionTrait>(db: &C, store_id: Uuid, id: Uuid) -> Result<billboard::Model, ServiceError> {
    scoped::<billboard::Entity, C>(db, billboard::Column::Id, billboard::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::invalid("Billboard does not belong to this store"))
}

pub async fn category_in_store<C: ConnectionTrait>(db: &C, store_id: Uuid, id: Uuid) -> Result<category::Model, ServiceError> {
    scoped::<category::Entity, C>(db, category::Column::Id, category::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::invalid("Category does not belong to this store"))
}

/// Subcategory must be in the store and under `category_id`.
pub async fn subcategory_in_category<C: ConnectionTrait>(
    db: &C,
    store_id: Uuid,
    category_id: Uuid,
    id: Uuid,
) -> Result<subcategory::Model, ServiceError> {
    let sub = scoped::<subcategory::Entity, C>(db, subcategory::Column::Id, subcategory::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::invalid("Subcategory does not belong to this store"))?;
    if sub.category_id != category_id {
        return Err(ServiceError::invalid("Subcategory does not belong to the selected category"));
    }
    Ok(sub)
}

pub async fn color_in_store<C: ConnectionTrait>(db: &C, store_id: Uuid, id: Uuid) -> Result<color::Model, ServiceError> {
    scoped::<color::Entity, C>(db, color::Column::Id, color::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::invalid("Color does not belong to this store"))
}

pub async fn size_in_store<C: ConnectionTrait>(db: &C, store_id: Uuid, id: Uuid) -> Result<size::Model, ServiceError> {
    scoped::<size::Entity, C>(db, size::Column::Id, size::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::invalid("Size does not belong to this store"))
}

pub async fn product_in_store<C: ConnectionTrait>(db: &C, store_id: Uuid, id: Uuid) -> Result<product::Model, ServiceError> {
    scoped::<product::Entity, C>(db, product::Column::Id, product::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::invalid("Product does not belong to this store"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_owner};

    #[test]
    fn lookup_parses_uuid_or_slug() {
        let id = Uuid::new_v4();
        assert_eq!(Lookup::parse(&id.to_string()), Lookup::Id(id));
        assert_eq!(Lookup::parse("Red-Shoes"), Lookup::Slug("red-shoes".into()));
    }

    #[tokio::test]
    async fn ownership_checks() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let (stranger, _) = seed_owner(&db, "stranger").await?;

        assert_eq!(owned_store(&db, shop.id, owner.id).await?.id, shop.id);
        assert!(matches!(owned_store(&db, shop.id, stranger.id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(owned_store(&db, Uuid::new_v4(), owner.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn references_must_share_store() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, a) = seed_owner(&db, "a").await?;
        let (_, b) = seed_owner(&db, "b").await?;
        let red = color::create(&db, a.id, "Red", "#f00").await?;
        assert!(color_in_store(&db, a.id, red.id).await.is_ok());
        assert!(matches!(color_in_store(&db, b.id, red.id).await, Err(ServiceError::Validation(_))));
        Ok(())
    }
}
