use anyhow::Result;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use super::setup_test_db;
use crate::{billboard, category, image, news, order, order_item, product, store, user, user_credentials};
use crate::category::NewCategory;
use crate::news::NewNews;
use crate::order::{NewOrder, OrderStatus};
use crate::product::NewProduct;

#[tokio::test]
async fn test_user_and_store_crud() -> Result<()> {
    let db = setup_test_db().await?;

    let u = user::create(&db, "  Alice@Example.com ", "Alice").await?;
    assert_eq!(u.email, "alice@example.com");
    let found = user::find_by_email(&db, "ALICE@example.com").await?;
    assert_eq!(found.map(|f| f.id), Some(u.id));

    let s = store::create(&db, u.id, " Corner Shop ").await?;
    assert_eq!(s.name, "Corner Shop");

    let mut am: store::ActiveModel = s.clone().into();
    am.name = Set("Renamed".into());
    let updated = am.update(&db).await?;
    assert_eq!(updated.name, "Renamed");

    store::Entity::delete_by_id(s.id).exec(&db).await?;
    assert!(store::Entity::find_by_id(s.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_validation_errors_before_insert() -> Result<()> {
    let db = setup_test_db().await?;
    assert!(user::create(&db, "no-at-sign", "Bob").await.is_err());
    let u = user::create(&db, "bob@example.com", "Bob").await?;
    assert!(store::create(&db, u.id, "   ").await.is_err());
    let s = store::create(&db, u.id, "Shop").await?;
    assert!(billboard::create(&db, s.id, "Hero", "not a url", false).await.is_err());
    let cat = category::create(&db, NewCategory { store_id: s.id, parent_id: None, billboard_id: None, name: "Shoes".into(), slug: None }).await?;
    let bad_price = product::create(
        &db,
        NewProduct {
            store_id: s.id,
            category_id: cat.id,
            subcategory_id: None,
            name: "Boot".into(),
            slug: None,
            description: String::new(),
            price_cents: -5,
            stock: 1,
            is_featured: false,
            is_archived: false,
        },
    )
    .await;
    assert!(bad_price.is_err());
    Ok(())
}

#[tokio::test]
async fn test_slug_derived_from_name() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "carol@example.com", "Carol").await?;
    let s = store::create(&db, u.id, "Shop").await?;
    let cat = category::create(&db, NewCategory { store_id: s.id, parent_id: None, billboard_id: None, name: "Running Shoes".into(), slug: None }).await?;
    assert_eq!(cat.slug, "running-shoes");
    let n = news::create(
        &db,
        NewNews { store_id: s.id, title: "Spring Launch!".into(), slug: Some("Spring 2025".into()), content: "<p>hi</p>".into(), image_url: None, is_published: true },
    )
    .await?;
    assert_eq!(n.slug, "spring-2025");
    Ok(())
}

#[tokio::test]
async fn test_order_with_items_and_images() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "dave@example.com", "Dave").await?;
    let s = store::create(&db, u.id, "Shop").await?;
    let cat = category::create(&db, NewCategory { store_id: s.id, parent_id: None, billboard_id: None, name: "Hats".into(), slug: None }).await?;
    let p = product::create(
        &db,
        NewProduct {
            store_id: s.id,
            category_id: cat.id,
            subcategory_id: None,
            name: "Cap".into(),
            slug: None,
            description: "A cap".into(),
            price_cents: 1999,
            stock: 4,
            is_featured: true,
            is_archived: false,
        },
    )
    .await?;
    image::create(&db, image::Owner::Product(p.id), "/uploads/cap-1.png").await?;
    image::create(&db, image::Owner::Product(p.id), "/uploads/cap-2.png").await?;
    assert_eq!(image::find_by_owner(&db, image::Owner::Product(p.id)).await?.len(), 2);

    let o = order::create(&db, NewOrder { store_id: s.id, username: "Eve".into(), phone: "555-1234".into(), address: "1 Main St".into(), is_paid: false }).await?;
    assert_eq!(o.status()?, OrderStatus::Pending);
    order_item::create(&db, o.id, p.id, 2, p.price_cents).await?;
    assert!(order_item::create(&db, o.id, p.id, 0, p.price_cents).await.is_err());
    let items = order_item::find_for_order(&db, o.id).await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].unit_price_cents, 1999);
    Ok(())
}

#[tokio::test]
async fn test_password_upsert_replaces_hash() -> Result<()> {
    let db = setup_test_db().await?;
    let u = user::create(&db, "frank@example.com", "Frank").await?;
    let first = user_credentials::upsert_password(&db, u.id, "hash-1".into(), "argon2").await?;
    let second = user_credentials::upsert_password(&db, u.id, "hash-2".into(), "argon2").await?;
    assert_eq!(first.id, second.id);
    let stored = user_credentials::find_for_user(&db, u.id).await?.map(|c| c.password_hash);
    assert_eq!(stored.as_deref(), Some("hash-2"));
    assert!(user_credentials::upsert_password(&db, u.id, " ".into(), "argon2").await.is_err());
    Ok(())
}
