use std::collections::{HashMap, HashSet};

use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::image::Owner;
use models::product::NewProduct;
use models::{category, color, image, order_item, product, product_color, product_size, size, slug, subcategory, validate};
use crate::access::{self, Lookup};
use crate::errors::ServiceError;
use crate::storage::{cleanup_blobs, ObjectStore};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorVariantInput {
    pub color_id: Uuid,
    pub price_cents: Option<i64>,
    pub stock: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeVariantInput {
    pub size_id: Uuid,
    pub price_cents: Option<i64>,
    pub stock: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[serde(default)]
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub stock: i32,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub colors: Vec<ColorVariantInput>,
    #[serde(default)]
    pub sizes: Vec<SizeVariantInput>,
}

/// Absent fields stay as they are; `images`, `colors` and `sizes` replace the whole set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i32>,
    pub category_id: Option<Uuid>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    pub subcategory_id: Option<Option<Uuid>>,
    pub is_featured: Option<bool>,
    pub is_archived: Option<bool>,
    pub images: Option<Vec<String>>,
    pub colors: Option<Vec<ColorVariantInput>>,
    pub sizes: Option<Vec<SizeVariantInput>>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub color_id: Option<Uuid>,
    pub size_id: Option<Uuid>,
    pub is_featured: Option<bool>,
    pub include_archived: bool,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorVariant {
    #[serde(flatten)]
    pub variant: product_color::Model,
    pub color: Option<color::Model>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeVariant {
    #[serde(flatten)]
    pub variant: product_size::Model,
    pub size: Option<size::Model>,
}

/// A product with its images, category and variants.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: product::Model,
    pub images: Vec<image::Model>,
    pub category: Option<category::Model>,
    pub subcategory: Option<subcategory::Model>,
    pub colors: Vec<ColorVariant>,
    pub sizes: Vec<SizeVariant>,
}

fn validate_images(urls: &[String]) -> Result<Vec<String>, ServiceError> {
    if urls.is_empty() {
        return Err(ServiceError::invalid("Images are required"));
    }
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(urls.len());
    for u in urls {
        let u = validate::image_url("Image URL", u)?;
        if seen.insert(u.clone()) {
            out.push(u);
        }
    }
    Ok(out)
}

fn validate_variant(price_cents: Option<i64>, stock: Option<i32>) -> Result<(), ServiceError> {
    if let Some(p) = price_cents {
        product::validate_price(p)?;
    }
    if let Some(s) = stock {
        product::validate_stock(s)?;
    }
    Ok(())
}

async fn check_references<C: ConnectionTrait>(
    db: &C,
    store_id: Uuid,
    category_id: Uuid,
    subcategory_id: Option<Uuid>,
) -> Result<(), ServiceError> {
    access::category_in_store(db, store_id, category_id).await?;
    if let Some(s) = subcategory_id {
        access::subcategory_in_category(db, store_id, category_id, s).await?;
    }
    Ok(())
}

async fn replace_images<C: ConnectionTrait>(db: &C, product_id: Uuid, urls: &[String]) -> Result<(), ServiceError> {
    image::Entity::delete_many().filter(image::Column::ProductId.eq(product_id)).exec(db).await?;
    for u in urls {
        image::create(db, Owner::Product(product_id), u).await?;
    }
    Ok(())
}

async fn replace_colors<C: ConnectionTrait>(db: &C, store_id: Uuid, product_id: Uuid, colors: &[ColorVariantInput]) -> Result<(), ServiceError> {
    product_color::Entity::delete_many().filter(product_color::Column::ProductId.eq(product_id)).exec(db).await?;
    let mut seen = HashSet::new();
    for c in colors {
        if !seen.insert(c.color_id) {
            return Err(ServiceError::invalid("Each color can be listed once"));
        }
        validate_variant(c.price_cents, c.stock)?;
        access::color_in_store(db, store_id, c.color_id).await?;
        product_color::create(db, product_id, c.color_id, c.price_cents, c.stock).await?;
    }
    Ok(())
}

async fn replace_sizes<C: ConnectionTrait>(db: &C, store_id: Uuid, product_id: Uuid, sizes: &[SizeVariantInput]) -> Result<(), ServiceError> {
    product_size::Entity::delete_many().filter(product_size::Column::ProductId.eq(product_id)).exec(db).await?;
    let mut seen = HashSet::new();
    for s in sizes {
        if !seen.insert(s.size_id) {
            return Err(ServiceError::invalid("Each size can be listed once"));
        }
        validate_variant(s.price_cents, s.stock)?;
        access::size_in_store(db, store_id, s.size_id).await?;
        product_size::create(db, product_id, s.size_id, s.price_cents, s.stock).await?;
    }
    Ok(())
}

/// Load images, categories and variants for a batch of products in a fixed number of queries.
async fn hydrate<C: ConnectionTrait>(db: &C, products: Vec<product::Model>) -> Result<Vec<ProductView>, ServiceError> {
    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();

    let mut images: HashMap<Uuid, Vec<image::Model>> = HashMap::new();
    for img in image::Entity::find()
        .filter(image::Column::ProductId.is_in(ids.clone()))
        .order_by_asc(image::Column::CreatedAt)
        .all(db)
        .await?
    {
        if let Some(pid) = img.product_id {
            images.entry(pid).or_default().push(img);
        }
    }

    let category_ids: Vec<Uuid> = products.iter().map(|p| p.category_id).collect();
    let categories: HashMap<Uuid, category::Model> = category::Entity::find()
        .filter(category::Column::Id.is_in(category_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let subcategory_ids: Vec<Uuid> = products.iter().filter_map(|p| p.subcategory_id).collect();
    let subcategories: HashMap<Uuid, subcategory::Model> = subcategory::Entity::find()
        .filter(subcategory::Column::Id.is_in(subcategory_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let color_links = product_color::Entity::find().filter(product_color::Column::ProductId.is_in(ids.clone())).all(db).await?;
    let colors: HashMap<Uuid, color::Model> = color::Entity::find()
        .filter(color::Column::Id.is_in(color_links.iter().map(|l| l.color_id).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let mut color_variants: HashMap<Uuid, Vec<ColorVariant>> = HashMap::new();
    for link in color_links {
        let color = colors.get(&link.color_id).cloned();
        color_variants.entry(link.product_id).or_default().push(ColorVariant { variant: link, color });
    }

    let size_links = product_size::Entity::find().filter(product_size::Column::ProductId.is_in(ids)).all(db).await?;
    let sizes: HashMap<Uuid, size::Model> = size::Entity::find()
        .filter(size::Column::Id.is_in(size_links.iter().map(|l| l.size_id).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let mut size_variants: HashMap<Uuid, Vec<SizeVariant>> = HashMap::new();
    for link in size_links {
        let size = sizes.get(&link.size_id).cloned();
        size_variants.entry(link.product_id).or_default().push(SizeVariant { variant: link, size });
    }

    Ok(products
        .into_iter()
        .map(|p| ProductView {
            images: images.remove(&p.id).unwrap_or_default(),
            category: categories.get(&p.category_id).cloned(),
            subcategory: p.subcategory_id.and_then(|s| subcategories.get(&s).cloned()),
            colors: color_variants.remove(&p.id).unwrap_or_default(),
            sizes: size_variants.remove(&p.id).unwrap_or_default(),
            product: p,
        })
        .collect())
}

/// Products of a store matching `filter`, newest first.
#[instrument(skip(db, filter), fields(%store_id))]
pub async fn list_products(db: &DatabaseConnection, store_id: Uuid, filter: ProductFilter) -> Result<Page<ProductView>, ServiceError> {
    access::find_store(db, store_id).await?;
    let mut q = product::Entity::find().filter(product::Column::StoreId.eq(store_id));
    if !filter.include_archived {
        q = q.filter(product::Column::IsArchived.eq(false));
    }
    if let Some(c) = filter.category_id {
        q = q.filter(product::Column::CategoryId.eq(c));
    }
    if let Some(s) = filter.subcategory_id {
        q = q.filter(product::Column::SubcategoryId.eq(s));
    }
    if let Some(f) = filter.is_featured {
        q = q.filter(product::Column::IsFeatured.eq(f));
    }
    if let Some(color_id) = filter.color_id {
        q = q.filter(
            product::Column::Id.in_subquery(
                Query::select()
                    .column(product_color::Column::ProductId)
                    .from(product_color::Entity)
                    .and_where(product_color::Column::ColorId.eq(color_id))
                    .to_owned(),
            ),
        );
    }
    if let Some(size_id) = filter.size_id {
        q = q.filter(
            product::Column::Id.in_subquery(
                Query::select()
                    .column(product_size::Column::ProductId)
                    .from(product_size::Entity)
                    .and_where(product_size::Column::SizeId.eq(size_id))
                    .to_owned(),
            ),
        );
    }

    let total = q.clone().count(db).await?;
    let (page_idx, per_page) = filter.pagination.normalize();
    let rows = q
        .order_by_desc(product::Column::CreatedAt)
        .order_by_asc(product::Column::Id)
        .offset(page_idx * per_page)
        .limit(per_page)
        .all(db)
        .await?;
    let items = hydrate(db, rows).await?;
    Ok(Page { items, page: page_idx + 1, per_page, total })
}

/// One product by id or slug. Archived products are hidden unless `include_archived`.
pub async fn get_product(db: &DatabaseConnection, store_id: Uuid, key: &Lookup, include_archived: bool) -> Result<ProductView, ServiceError> {
    let found = access::scoped_lookup::<product::Entity, _>(
        db,
        product::Column::Id,
        product::Column::Slug,
        product::Column::StoreId,
        store_id,
        key,
    )
    .await?
    .filter(|p| include_archived || !p.is_archived)
    .ok_or_else(|| ServiceError::not_found("Product"))?;
    hydrate(db, vec![found])
        .await?
        .pop()
        .ok_or_else(|| ServiceError::not_found("Product"))
}

#[instrument(skip(db, input), fields(%store_id))]
pub async fn create_product(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, input: ProductInput) -> Result<ProductView, ServiceError> {
    let name = product::validate_name(&input.name)?;
    let price_cents = input.price_cents.ok_or_else(|| ServiceError::invalid("Price is required"))?;
    let category_id = input.category_id.ok_or_else(|| ServiceError::invalid("Category id is required"))?;
    let images = validate_images(&input.images)?;
    let slug = slug::resolve_slug(input.slug.as_deref(), &name)?;
    product::validate_price(price_cents)?;
    product::validate_stock(input.stock)?;
    access::owned_store(db, store_id, user_id).await?;

    let txn = db.begin().await?;
    check_references(&txn, store_id, category_id, input.subcategory_id).await?;
    access::ensure_slug_free::<product::Entity, _>(
        &txn,
        product::Column::Id,
        product::Column::Slug,
        product::Column::StoreId,
        store_id,
        &slug,
        None,
    )
    .await?;
    let created = product::create(
        &txn,
        NewProduct {
            store_id,
            category_id,
            subcategory_id: input.subcategory_id,
            name,
            slug: Some(slug),
            description: input.description,
            price_cents,
            stock: input.stock,
            is_featured: input.is_featured,
            is_archived: input.is_archived,
        },
    )
    .await?;
    replace_images(&txn, created.id, &images).await?;
    replace_colors(&txn, store_id, created.id, &input.colors).await?;
    replace_sizes(&txn, store_id, created.id, &input.sizes).await?;
    let view = hydrate(&txn, vec![created]).await?.pop().ok_or_else(|| ServiceError::not_found("Product"))?;
    txn.commit().await?;
    info!(product_id = %view.product.id, "product_created");
    Ok(view)
}

/// Update a product. Images dropped from the set are removed from storage after commit.
#[instrument(skip(db, objects, patch), fields(%store_id, %id))]
pub async fn update_product(
    db: &DatabaseConnection,
    objects: &dyn ObjectStore,
    user_id: Uuid,
    store_id: Uuid,
    id: Uuid,
    patch: ProductPatch,
) -> Result<ProductView, ServiceError> {
    let name = patch.name.as_deref().map(product::validate_name).transpose()?;
    let explicit_slug = patch.slug.as_deref().map(|s| slug::resolve_slug(Some(s), s)).transpose()?;
    let images = patch.images.as_deref().map(validate_images).transpose()?;
    if let Some(p) = patch.price_cents {
        product::validate_price(p)?;
    }
    if let Some(s) = patch.stock {
        product::validate_stock(s)?;
    }
    access::owned_store(db, store_id, user_id).await?;

    let txn = db.begin().await?;
    let current = access::scoped::<product::Entity, _>(&txn, product::Column::Id, product::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product"))?;

    let category_id = patch.category_id.unwrap_or(current.category_id);
    let subcategory_id = match patch.subcategory_id {
        Some(s) => s,
        // moving category drops a subcategory that no longer fits
        None if category_id != current.category_id => None,
        None => current.subcategory_id,
    };
    check_references(&txn, store_id, category_id, subcategory_id).await?;
    if let Some(s) = &explicit_slug {
        access::ensure_slug_free::<product::Entity, _>(
            &txn,
            product::Column::Id,
            product::Column::Slug,
            product::Column::StoreId,
            store_id,
            s,
            Some(id),
        )
        .await?;
    }

    let mut removed = Vec::new();
    if let Some(new_urls) = &images {
        let keep: HashSet<&String> = new_urls.iter().collect();
        removed = image::find_by_owner(&txn, Owner::Product(id))
            .await?
            .into_iter()
            .map(|i| i.url)
            .filter(|u| !keep.contains(u))
            .collect();
        replace_images(&txn, id, new_urls).await?;
    }
    if let Some(colors) = &patch.colors {
        replace_colors(&txn, store_id, id, colors).await?;
    }
    if let Some(sizes) = &patch.sizes {
        replace_sizes(&txn, store_id, id, sizes).await?;
    }

    let mut am: product::ActiveModel = current.into();
    if let Some(n) = name { am.name = Set(n); }
    if let Some(s) = explicit_slug { am.slug = Set(s); }
    if let Some(d) = patch.description { am.description = Set(d.trim().to_string()); }
    if let Some(p) = patch.price_cents { am.price_cents = Set(p); }
    if let Some(s) = patch.stock { am.stock = Set(s); }
    if let Some(f) = patch.is_featured { am.is_featured = Set(f); }
    if let Some(a) = patch.is_archived { am.is_archived = Set(a); }
    am.category_id = Set(category_id);
    am.subcategory_id = Set(subcategory_id);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;
    let view = hydrate(&txn, vec![updated]).await?.pop().ok_or_else(|| ServiceError::not_found("Product"))?;
    txn.commit().await?;

    if !removed.is_empty() {
        cleanup_blobs(objects, &removed).await;
    }
    Ok(view)
}

/// Delete a product with its images and variants, then its blobs.
/// Products that appear on orders are kept; archive them instead.
#[instrument(skip(db, objects), fields(%store_id, %id))]
pub async fn delete_product(db: &DatabaseConnection, objects: &dyn ObjectStore, user_id: Uuid, store_id: Uuid, id: Uuid) -> Result<product::Model, ServiceError> {
    access::owned_store(db, store_id, user_id).await?;
    let txn = db.begin().await?;
    let found = access::scoped::<product::Entity, _>(&txn, product::Column::Id, product::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product"))?;
    let ordered = order_item::Entity::find().filter(order_item::Column::ProductId.eq(id)).count(&txn).await?;
    if ordered > 0 {
        return Err(ServiceError::conflict("Product appears on orders; archive it instead"));
    }
    let urls: Vec<String> = image::find_by_owner(&txn, Owner::Product(id)).await?.into_iter().map(|i| i.url).collect();
    image::Entity::delete_many().filter(image::Column::ProductId.eq(id)).exec(&txn).await?;
    product::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    let failed = cleanup_blobs(objects, &urls).await;
    info!(images = urls.len(), failed, "product_deleted");
    Ok(found)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::category_service::{create_category, CategoryInput};
    use crate::services::color_service::{create_color, ColorInput};
    use crate::storage::mock::RecordingObjectStore;
    use crate::test_support::{get_db, seed_owner};

    pub(crate) fn product_input(name: &str, category_id: Uuid, price_cents: i64, stock: i32) -> ProductInput {
        ProductInput {
            name: name.into(),
            slug: None,
            description: String::new(),
            price_cents: Some(price_cents),
            stock,
            category_id: Some(category_id),
            subcategory_id: None,
            is_featured: false,
            is_archived: false,
            images: vec![format!("/uploads/{}.png", slug::slugify(name))],
            colors: vec![],
            sizes: vec![],
        }
    }

    pub(crate) async fn category(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, name: &str) -> Result<category::Model, ServiceError> {
        create_category(db, user_id, store_id, CategoryInput { name: name.into(), slug: None, parent_id: None, billboard_id: None }).await
    }

    #[tokio::test]
    async fn create_with_variants_and_filter() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let hats = category(&db, owner.id, shop.id, "Hats").await?;
        let red = create_color(&db, owner.id, shop.id, ColorInput { name: "Red".into(), value: "#f00".into() }).await?;

        let mut input = product_input("Red Cap", hats.id, 1500, 3);
        input.colors = vec![ColorVariantInput { color_id: red.id, price_cents: Some(1700), stock: Some(1) }];
        input.is_featured = true;
        let cap = create_product(&db, owner.id, shop.id, input).await?;
        assert_eq!(cap.images.len(), 1);
        assert_eq!(cap.colors[0].color.as_ref().map(|c| c.name.as_str()), Some("Red"));
        create_product(&db, owner.id, shop.id, product_input("Plain Beanie", hats.id, 900, 5)).await?;

        let by_color = list_products(&db, shop.id, ProductFilter { color_id: Some(red.id), ..Default::default() }).await?;
        assert_eq!(by_color.total, 1);
        assert_eq!(by_color.items[0].product.id, cap.product.id);
        let featured = list_products(&db, shop.id, ProductFilter { is_featured: Some(true), ..Default::default() }).await?;
        assert_eq!(featured.total, 1);
        let all = list_products(&db, shop.id, ProductFilter { category_id: Some(hats.id), ..Default::default() }).await?;
        assert_eq!(all.total, 2);

        let by_slug = get_product(&db, shop.id, &Lookup::parse("red-cap"), false).await?;
        assert_eq!(by_slug.product.id, cap.product.id);
        Ok(())
    }

    #[tokio::test]
    async fn archived_products_hidden_from_storefront() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let hats = category(&db, owner.id, shop.id, "Hats").await?;
        let mut input = product_input("Old Cap", hats.id, 500, 0);
        input.is_archived = true;
        let old = create_product(&db, owner.id, shop.id, input).await?;

        assert_eq!(list_products(&db, shop.id, ProductFilter::default()).await?.total, 0);
        assert!(get_product(&db, shop.id, &Lookup::Id(old.product.id), false).await.is_err());
        assert!(get_product(&db, shop.id, &Lookup::Id(old.product.id), true).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn references_and_required_fields_validated() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let (other_owner, other) = seed_owner(&db, "other").await?;
        let hats = category(&db, owner.id, shop.id, "Hats").await?;
        let foreign = category(&db, other_owner.id, other.id, "Foreign").await?;

        let mut no_images = product_input("Cap", hats.id, 100, 1);
        no_images.images.clear();
        assert!(matches!(create_product(&db, owner.id, shop.id, no_images).await, Err(ServiceError::Validation(_))));

        let cross = product_input("Cap", foreign.id, 100, 1);
        assert!(matches!(create_product(&db, owner.id, shop.id, cross).await, Err(ServiceError::Validation(_))));
        assert!(list_products(&db, shop.id, ProductFilter::default()).await?.items.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn image_replacement_and_delete_clean_blobs() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let hats = category(&db, owner.id, shop.id, "Hats").await?;
        let mut input = product_input("Cap", hats.id, 100, 1);
        input.images = vec!["/uploads/a.png".into(), "/uploads/b.png".into()];
        let cap = create_product(&db, owner.id, shop.id, input).await?;

        let objects = RecordingObjectStore::default();
        let patch = ProductPatch { images: Some(vec!["/uploads/b.png".into(), "/uploads/c.png".into()]), ..Default::default() };
        let updated = update_product(&db, &objects, owner.id, shop.id, cap.product.id, patch).await?;
        assert_eq!(updated.images.len(), 2);
        assert_eq!(objects.deleted(), vec!["/uploads/a.png"]);

        delete_product(&db, &objects, owner.id, shop.id, cap.product.id).await?;
        let mut deleted = objects.deleted();
        deleted.sort();
        assert_eq!(deleted, vec!["/uploads/a.png", "/uploads/b.png", "/uploads/c.png"]);
        assert!(image::Entity::find().all(&db).await?.is_empty());
        Ok(())
    }
}
