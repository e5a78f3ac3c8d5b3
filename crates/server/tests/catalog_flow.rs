mod support;

use axum::http::StatusCode;
use serde_json::{json, Value};

use support::{build_app, create_store, login, send};

fn id(v: &Value) -> String {
    v["id"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_storefront_reads_and_checkout() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let owner = login(&mut app, "owner").await?;
    let store = create_store(&mut app, &owner, "Shoes").await?;

    let (status, cat) = send(&mut app, "POST", &format!("/api/{store}/categories"), Some(&owner), Some(json!({"name": "Running Shoes"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cat["slug"], "running-shoes");

    let product = json!({
        "name": "Trail Runner",
        "priceCents": 12000,
        "stock": 3,
        "categoryId": id(&cat),
        "images": ["/uploads/trail.png"]
    });
    let (status, p) = send(&mut app, "POST", &format!("/api/{store}/products"), Some(&owner), Some(product)).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, hidden) = send(&mut app, "POST", &format!("/api/{store}/products"), Some(&owner), Some(json!({
        "name": "Old Model", "priceCents": 5000, "stock": 1, "categoryId": id(&cat),
        "images": ["/uploads/old.png"], "isArchived": true
    }))).await?;
    assert_eq!(status, StatusCode::OK);

    // anonymous reads
    let (status, page) = send(&mut app, "GET", &format!("/api/{store}/products?includeArchived=true"), None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["slug"], "trail-runner");
    let (status, _) = send(&mut app, "GET", &format!("/api/{store}/products/old-model"), None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, by_slug) = send(&mut app, "GET", &format!("/api/{store}/products/trail-runner"), None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_slug["category"]["name"], "Running Shoes");

    // owner sees archived rows on request
    let (_, page) = send(&mut app, "GET", &format!("/api/{store}/products?includeArchived=true"), Some(&owner), None).await?;
    assert_eq!(page["total"], 2);

    // checkout takes stock; archived products cannot be bought
    let order = json!({"username": "Ann", "phone": "555-0100", "address": "1 Main St", "items": [{"productId": id(&p), "quantity": 2}]});
    let (status, placed) = send(&mut app, "POST", &format!("/api/{store}/checkout"), None, Some(order)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(placed["totalCents"], 24000);
    let archived = json!({"username": "Ann", "phone": "555-0100", "address": "1 Main St", "items": [{"productId": id(&hidden), "quantity": 1}]});
    let (status, _) = send(&mut app, "POST", &format!("/api/{store}/checkout"), None, Some(archived)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let too_many = json!({"username": "Bo", "phone": "555-0101", "address": "2 Main St", "items": [{"productId": id(&p), "quantity": 2}]});
    let (status, body) = send(&mut app, "POST", &format!("/api/{store}/checkout"), None, Some(too_many)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Insufficient stock for Trail Runner");

    // cancelling gives the units back once
    let order_uri = format!("/api/{store}/orders/{}", id(&placed));
    let (status, cancelled) = send(&mut app, "PATCH", &order_uri, Some(&owner), Some(json!({"status": "cancelled"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
    let (status, _) = send(&mut app, "PATCH", &order_uri, Some(&owner), Some(json!({"status": "paid"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, p) = send(&mut app, "GET", &format!("/api/{store}/products/{}", id(&p)), None, None).await?;
    assert_eq!(p["stock"], 3);
    Ok(())
}

#[tokio::test]
async fn test_category_tree_and_dependents() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let owner = login(&mut app, "owner").await?;
    let store = create_store(&mut app, &owner, "Outdoor").await?;
    let uri = format!("/api/{store}/categories");

    let (_, root) = send(&mut app, "POST", &uri, Some(&owner), Some(json!({"name": "Camping"}))).await?;
    let (status, child) = send(&mut app, "POST", &uri, Some(&owner), Some(json!({"name": "Tents", "parentId": id(&root)}))).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, tree) = send(&mut app, "GET", &format!("{uri}/tree"), None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tree["roots"][0]["name"], "Camping");
    assert_eq!(tree["roots"][0]["children"][0]["name"], "Tents");

    // a category cannot move under its own descendant
    let (status, _) = send(&mut app, "PATCH", &format!("{uri}/{}", id(&root)), Some(&owner), Some(json!({"parentId": id(&child)}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&mut app, "DELETE", &format!("{uri}/{}", id(&root)), Some(&owner), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&mut app, "DELETE", &format!("{uri}/{}", id(&child)), Some(&owner), None).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&mut app, "DELETE", &format!("{uri}/{}", id(&root)), Some(&owner), None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_foreign_references_are_rejected() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let owner = login(&mut app, "owner").await?;
    let first = create_store(&mut app, &owner, "First").await?;
    let second = create_store(&mut app, &owner, "Second").await?;

    let (_, cat) = send(&mut app, "POST", &format!("/api/{first}/categories"), Some(&owner), Some(json!({"name": "Hats"}))).await?;
    let product = json!({"name": "Cap", "priceCents": 900, "stock": 1, "categoryId": id(&cat), "images": ["/uploads/cap.png"]});
    let (status, _) = send(&mut app, "POST", &format!("/api/{second}/products"), Some(&owner), Some(product)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&mut app, "POST", &format!("/api/{first}/colors"), Some(&owner), Some(json!({"name": "Red", "value": "red"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&mut app, "POST", &format!("/api/{first}/colors"), Some(&owner), Some(json!({"name": "Red", "value": "#ff0000"}))).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_news_drafts_stay_private() -> anyhow::Result<()> {
    let mut app = build_app().await?;
    let owner = login(&mut app, "owner").await?;
    let stranger = login(&mut app, "stranger").await?;
    let store = create_store(&mut app, &owner, "Gazette").await?;
    let uri = format!("/api/{store}/news");

    let (status, _) = send(&mut app, "POST", &uri, Some(&owner), Some(json!({"title": "Secret Launch", "content": "embargoed", "isPublished": false}))).await?;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&mut app, "POST", &uri, Some(&owner), Some(json!({"title": "Open Day", "content": "come by", "isPublished": true}))).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, list) = send(&mut app, "GET", &uri, None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(|a| a.len()), Some(1));
    assert_eq!(list[0]["slug"], "open-day");
    let (status, _) = send(&mut app, "GET", &format!("{uri}/secret-launch"), None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // another signed-in user is still a visitor here
    let (_, list) = send(&mut app, "GET", &uri, Some(&stranger), None).await?;
    assert_eq!(list.as_array().map(|a| a.len()), Some(1));
    let (status, _) = send(&mut app, "GET", &format!("{uri}/secret-launch"), Some(&stranger), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&mut app, "GET", &uri, Some(&owner), None).await?;
    assert_eq!(list.as_array().map(|a| a.len()), Some(2));
    let (status, draft) = send(&mut app, "GET", &format!("{uri}/secret-launch"), Some(&owner), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["isPublished"], false);
    Ok(())
}
