use anyhow::Result;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use super::setup_test_db;
use crate::category::NewCategory;
use crate::{billboard, category, store, user};

#[tokio::test]
async fn test_slug_unique_per_store() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "gina@example.com", "Gina").await?;
    let a = store::create(&db, u.id, "A").await?;
    let b = store::create(&db, u.id, "B").await?;
    let new = |store_id| NewCategory { store_id, parent_id: None, billboard_id: None, name: "Bags".into(), slug: None };

    category::create(&db, new(a.id)).await?;
    assert!(category::create(&db, new(a.id)).await.is_err(), "duplicate slug in same store");
    category::create(&db, new(b.id)).await?;
    Ok(())
}

#[tokio::test]
async fn test_store_delete_cascades() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "hank@example.com", "Hank").await?;
    let s = store::create(&db, u.id, "Shop").await?;
    let bb = billboard::create(&db, s.id, "Hero", "/uploads/hero.png", true).await?;
    store::Entity::delete_by_id(s.id).exec(&db).await?;
    assert!(billboard::Entity::find_by_id(bb.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_billboard_delete_clears_category_reference() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "ivy@example.com", "Ivy").await?;
    let s = store::create(&db, u.id, "Shop").await?;
    let bb = billboard::create(&db, s.id, "Hero", "/uploads/hero.png", false).await?;
    let cat = category::create(&db, NewCategory { store_id: s.id, parent_id: None, billboard_id: Some(bb.id), name: "Coats".into(), slug: None }).await?;
    billboard::Entity::delete_by_id(bb.id).exec(&db).await?;
    let cat = category::Entity::find_by_id(cat.id).one(&db).await?.expect("category survives");
    assert_eq!(cat.billboard_id, None);
    Ok(())
}

#[tokio::test]
async fn test_parent_category_delete_is_restricted() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "jack@example.com", "Jack").await?;
    let s = store::create(&db, u.id, "Shop").await?;
    let parent = category::create(&db, NewCategory { store_id: s.id, parent_id: None, billboard_id: None, name: "Clothing".into(), slug: None }).await?;
    let child = category::create(&db, NewCategory { store_id: s.id, parent_id: Some(parent.id), billboard_id: None, name: "Shirts".into(), slug: None }).await?;
    assert!(category::Entity::delete_by_id(parent.id).exec(&db).await.is_err());

    let mut am: category::ActiveModel = child.into();
    am.parent_id = Set(None);
    am.update(&db).await?;
    category::Entity::delete_by_id(parent.id).exec(&db).await?;
    Ok(())
}
