use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use models::news::{self, NewNews};
use models::{slug, validate};
use crate::access::{self, Lookup};
use crate::errors::ServiceError;
use crate::storage::{cleanup_blobs, ObjectStore};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsInput {
    #[serde(default)]
    pub title: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub content: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "crate::patch::nullable")]
    pub image_url: Option<Option<String>>,
    pub is_published: Option<bool>,
}

/// News of a store, newest first. `published_only` hides drafts.
pub async fn list_news(db: &DatabaseConnection, store_id: Uuid, published_only: bool) -> Result<Vec<news::Model>, ServiceError> {
    access::find_store(db, store_id).await?;
    let mut q = news::Entity::find().filter(news::Column::StoreId.eq(store_id));
    if published_only {
        q = q.filter(news::Column::IsPublished.eq(true));
    }
    Ok(q.order_by_desc(news::Column::CreatedAt).all(db).await?)
}

/// One article by id or slug. A draft is reported missing unless `include_drafts`.
pub async fn get_news(db: &DatabaseConnection, store_id: Uuid, key: &Lookup, include_drafts: bool) -> Result<news::Model, ServiceError> {
    access::scoped_lookup::<news::Entity, _>(db, news::Column::Id, news::Column::Slug, news::Column::StoreId, store_id, key)
        .await?
        .filter(|n| include_drafts || n.is_published)
        .ok_or_else(|| ServiceError::not_found("News"))
}

#[instrument(skip(db, input), fields(%store_id))]
pub async fn create_news(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, input: NewsInput) -> Result<news::Model, ServiceError> {
    let title = validate::required_text("Title", &input.title, 200)?;
    if input.content.trim().is_empty() {
        return Err(ServiceError::invalid("Content is required"));
    }
    let slug = slug::resolve_slug(input.slug.as_deref(), &title)?;
    let image_url = news::validate_image_url(input.image_url.as_deref())?;
    access::owned_store(db, store_id, user_id).await?;
    access::ensure_slug_free::<news::Entity, _>(db, news::Column::Id, news::Column::Slug, news::Column::StoreId, store_id, &slug, None).await?;
    let created = news::create(
        db,
        NewNews { store_id, title, slug: Some(slug), content: input.content, image_url, is_published: input.is_published },
    )
    .await?;
    info!(news_id = %created.id, "news_created");
    Ok(created)
}

/// Update an article. A replaced or cleared image is removed from storage after the write.
pub async fn update_news(
    db: &DatabaseConnection,
    objects: &dyn ObjectStore,
    user_id: Uuid,
    store_id: Uuid,
    id: Uuid,
    patch: NewsPatch,
) -> Result<news::Model, ServiceError> {
    let title = patch.title.as_deref().map(|t| validate::required_text("Title", t, 200)).transpose()?;
    let explicit_slug = patch.slug.as_deref().map(|s| slug::resolve_slug(Some(s), s)).transpose()?;
    if patch.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(ServiceError::invalid("Content is required"));
    }
    let image_url = patch.image_url.map(|u| news::validate_image_url(u.as_deref())).transpose()?;
    access::owned_store(db, store_id, user_id).await?;
    let current = get_news(db, store_id, &Lookup::Id(id), true).await?;
    if let Some(s) = &explicit_slug {
        access::ensure_slug_free::<news::Entity, _>(db, news::Column::Id, news::Column::Slug, news::Column::StoreId, store_id, s, Some(id))
            .await?;
    }

    let replaced = match (&image_url, &current.image_url) {
        (Some(new), Some(old)) if new.as_ref() != Some(old) => Some(old.clone()),
        _ => None,
    };
    let mut am: news::ActiveModel = current.into();
    if let Some(t) = title { am.title = Set(t); }
    if let Some(s) = explicit_slug { am.slug = Set(s); }
    if let Some(c) = patch.content { am.content = Set(c); }
    if let Some(u) = image_url { am.image_url = Set(u); }
    if let Some(p) = patch.is_published { am.is_published = Set(p); }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;

    if let Some(old) = replaced {
        cleanup_blobs(objects, &[old]).await;
    }
    Ok(updated)
}

#[instrument(skip(db, objects), fields(%store_id, %id))]
pub async fn delete_news(db: &DatabaseConnection, objects: &dyn ObjectStore, user_id: Uuid, store_id: Uuid, id: Uuid) -> Result<news::Model, ServiceError> {
    access::owned_store(db, store_id, user_id).await?;
    let found = get_news(db, store_id, &Lookup::Id(id), true).await?;
    news::Entity::delete_by_id(id).exec(db).await?;
    if let Some(url) = &found.image_url {
        cleanup_blobs(objects, &[url.clone()]).await;
    }
    info!("news_deleted");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::mock::RecordingObjectStore;
    use crate::test_support::{get_db, seed_owner};

    fn input(title: &str, published: bool) -> NewsInput {
        NewsInput {
            title: title.into(),
            slug: None,
            content: "<p>Hello</p>".into(),
            image_url: Some("/uploads/news.png".into()),
            is_published: published,
        }
    }

    #[tokio::test]
    async fn drafts_hidden_when_published_only() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        create_news(&db, owner.id, shop.id, input("Spring Sale", true)).await?;
        create_news(&db, owner.id, shop.id, input("Draft", false)).await?;
        assert_eq!(list_news(&db, shop.id, true).await?.len(), 1);
        assert_eq!(list_news(&db, shop.id, false).await?.len(), 2);
        assert_eq!(get_news(&db, shop.id, &Lookup::parse("spring-sale"), false).await?.title, "Spring Sale");
        let draft = get_news(&db, shop.id, &Lookup::parse("draft"), false).await;
        assert!(matches!(draft, Err(ServiceError::NotFound(_))));
        assert!(get_news(&db, shop.id, &Lookup::parse("draft"), true).await?.title == "Draft");
        Ok(())
    }

    #[tokio::test]
    async fn empty_content_rejected() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let mut bad = input("Empty", true);
        bad.content = "   ".into();
        assert!(matches!(create_news(&db, owner.id, shop.id, bad).await, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn clearing_image_and_delete_clean_blobs() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let objects = RecordingObjectStore::default();
        let first = create_news(&db, owner.id, shop.id, input("One", true)).await?;
        let patch = NewsPatch { image_url: Some(None), ..Default::default() };
        let cleared = update_news(&db, &objects, owner.id, shop.id, first.id, patch).await?;
        assert_eq!(cleared.image_url, None);
        assert_eq!(objects.deleted(), vec!["/uploads/news.png"]);

        let second = create_news(&db, owner.id, shop.id, input("Two", true)).await?;
        delete_news(&db, &objects, owner.id, shop.id, second.id).await?;
        assert_eq!(objects.deleted().len(), 2);
        assert!(get_news(&db, shop.id, &Lookup::Id(second.id), true).await.is_err());
        Ok(())
    }
}
