//! Orders and the stock they hold.
//!
//! Every write that moves stock runs in one transaction together with the
//! order rows. Stock is decremented with a conditional update
//! (`stock >= quantity`) so two concurrent checkouts cannot oversell.
//! Writes to an existing order lock its row and claim the status they read,
//! so a cancel or delete returns the stock once.

use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use common::metrics::{ORDERS_CREATED_TOTAL, STOCK_UNITS_ADJUSTED_TOTAL};
use models::order::{self, NewOrder, OrderStatus};
use models::{order_item, product, validate};
use crate::access;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

/// `items` replaces every line of the order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    pub username: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: Option<OrderStatus>,
    pub is_paid: Option<bool>,
    pub items: Option<Vec<OrderItemInput>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(flatten)]
    pub item: order_item::Model,
    pub product: Option<product::Model>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<OrderLine>,
    pub total_cents: i64,
}

/// Collapse repeated products into one line, keeping first-seen order.
fn merge_lines(items: &[OrderItemInput]) -> Result<Vec<(Uuid, i32)>, ServiceError> {
    if items.is_empty() {
        return Err(ServiceError::invalid("Items are required"));
    }
    let mut lines: Vec<(Uuid, i32)> = Vec::with_capacity(items.len());
    let mut index: HashMap<Uuid, usize> = HashMap::new();
    for it in items {
        if it.quantity <= 0 {
            return Err(ServiceError::invalid("Quantity must be positive"));
        }
        match index.get(&it.product_id) {
            Some(&i) => {
                lines[i].1 = lines[i]
                    .1
                    .checked_add(it.quantity)
                    .ok_or_else(|| ServiceError::invalid("Quantity is too large"))?;
            }
            None => {
                index.insert(it.product_id, lines.len());
                lines.push((it.product_id, it.quantity));
            }
        }
    }
    Ok(lines)
}

async fn take_stock<C: ConnectionTrait>(db: &C, p: &product::Model, quantity: i32) -> Result<(), ServiceError> {
    let res = product::Entity::update_many()
        .col_expr(product::Column::Stock, Expr::col(product::Column::Stock).sub(quantity))
        .filter(product::Column::Id.eq(p.id))
        .filter(product::Column::Stock.gte(quantity))
        .exec(db)
        .await?;
    if res.rows_affected != 1 {
        return Err(ServiceError::invalid(format!("Insufficient stock for {}", p.name)));
    }
    Ok(())
}

async fn return_stock<C: ConnectionTrait>(db: &C, items: &[order_item::Model]) -> Result<i64, ServiceError> {
    let mut units = 0i64;
    for it in items {
        product::Entity::update_many()
            .col_expr(product::Column::Stock, Expr::col(product::Column::Stock).add(it.quantity))
            .filter(product::Column::Id.eq(it.product_id))
            .exec(db)
            .await?;
        units += i64::from(it.quantity);
    }
    Ok(units)
}

/// Check, reserve and record each line. Returns the units taken from stock.
async fn add_lines<C: ConnectionTrait>(
    db: &C,
    store_id: Uuid,
    order_id: Uuid,
    lines: &[(Uuid, i32)],
    storefront: bool,
) -> Result<i64, ServiceError> {
    let mut units = 0i64;
    for &(product_id, quantity) in lines {
        let p = access::product_in_store(db, store_id, product_id).await?;
        if storefront && p.is_archived {
            return Err(ServiceError::invalid(format!("{} is no longer available", p.name)));
        }
        take_stock(db, &p, quantity).await?;
        order_item::create(db, order_id, p.id, quantity, p.price_cents).await?;
        units += i64::from(quantity);
    }
    Ok(units)
}

fn record_stock_moved(units: i64) {
    if units > 0 {
        STOCK_UNITS_ADJUSTED_TOTAL.inc_by(units.unsigned_abs());
    }
}

async fn hydrate<C: ConnectionTrait>(db: &C, orders: Vec<order::Model>) -> Result<Vec<OrderView>, ServiceError> {
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let items = order_item::Entity::find().filter(order_item::Column::OrderId.is_in(ids)).all(db).await?;
    let products: HashMap<Uuid, product::Model> = product::Entity::find()
        .filter(product::Column::Id.is_in(items.iter().map(|i| i.product_id).collect::<Vec<_>>()))
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for item in items {
        let product = products.get(&item.product_id).cloned();
        by_order.entry(item.order_id).or_default().push(OrderLine { item, product });
    }
    Ok(orders
        .into_iter()
        .map(|o| {
            let items = by_order.remove(&o.id).unwrap_or_default();
            let total_cents = items.iter().map(|l| l.item.unit_price_cents * i64::from(l.item.quantity)).sum();
            OrderView { order: o, items, total_cents }
        })
        .collect())
}

async fn place_order(db: &DatabaseConnection, store_id: Uuid, input: OrderInput, storefront: bool) -> Result<OrderView, ServiceError> {
    let username = validate::required_text("Username", &input.username, 128)?;
    let phone = validate::required_text("Phone", &input.phone, 32)?;
    let address = validate::required_text("Address", &input.address, 512)?;
    let lines = merge_lines(&input.items)?;

    let txn = db.begin().await?;
    let created = order::create(&txn, NewOrder { store_id, username, phone, address, is_paid: input.is_paid }).await?;
    let units = add_lines(&txn, store_id, created.id, &lines, storefront).await?;
    let view = hydrate(&txn, vec![created]).await?.pop().ok_or_else(|| ServiceError::not_found("Order"))?;
    txn.commit().await?;

    ORDERS_CREATED_TOTAL.inc();
    record_stock_moved(units);
    info!(order_id = %view.order.id, lines = lines.len(), units, storefront, "order_created");
    Ok(view)
}

/// Orders of a store, newest first. Owner only.
pub async fn list_orders(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid) -> Result<Vec<OrderView>, ServiceError> {
    access::owned_store(db, store_id, user_id).await?;
    let rows = order::Entity::find()
        .filter(order::Column::StoreId.eq(store_id))
        .order_by_desc(order::Column::CreatedAt)
        .all(db)
        .await?;
    hydrate(db, rows).await
}

async fn scoped_order<C: ConnectionTrait>(db: &C, store_id: Uuid, id: Uuid) -> Result<order::Model, ServiceError> {
    access::scoped::<order::Entity, C>(db, order::Column::Id, order::Column::StoreId, store_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Order"))
}

/// Like `scoped_order`, holding the row lock until the transaction ends.
async fn locked_order<C: ConnectionTrait>(db: &C, store_id: Uuid, id: Uuid) -> Result<order::Model, ServiceError> {
    order::Entity::find()
        .filter(order::Column::Id.eq(id))
        .filter(order::Column::StoreId.eq(store_id))
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Order"))
}

/// Move the order from the status it was read with to `next`. False when
/// another writer changed the status first.
async fn claim_status<C: ConnectionTrait>(db: &C, current: &order::Model, next: OrderStatus) -> Result<bool, ServiceError> {
    let res = order::Entity::update_many()
        .col_expr(order::Column::Status, Expr::value(next.as_str()))
        .filter(order::Column::Id.eq(current.id))
        .filter(order::Column::Status.eq(current.status.as_str()))
        .exec(db)
        .await?;
    Ok(res.rows_affected == 1)
}

pub async fn get_order(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, id: Uuid) -> Result<OrderView, ServiceError> {
    access::owned_store(db, store_id, user_id).await?;
    let found = scoped_order(db, store_id, id).await?;
    hydrate(db, vec![found]).await?.pop().ok_or_else(|| ServiceError::not_found("Order"))
}

/// Order entered from the dashboard.
#[instrument(skip(db, input), fields(%store_id))]
pub async fn create_order(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, input: OrderInput) -> Result<OrderView, ServiceError> {
    access::owned_store(db, store_id, user_id).await?;
    place_order(db, store_id, input, false).await
}

/// Order placed by a storefront visitor. Archived products cannot be bought.
#[instrument(skip(db, input), fields(%store_id))]
pub async fn checkout(db: &DatabaseConnection, store_id: Uuid, input: OrderInput) -> Result<OrderView, ServiceError> {
    access::find_store(db, store_id).await?;
    place_order(db, store_id, input, true).await
}

/// Update an order.
///
/// Cancelling gives the stock back; a cancelled order accepts no further
/// changes. Replacing the items returns the old quantities and takes the new
/// ones inside the same transaction.
#[instrument(skip(db, patch), fields(%store_id, %id))]
pub async fn update_order(
    db: &DatabaseConnection,
    user_id: Uuid,
    store_id: Uuid,
    id: Uuid,
    patch: OrderPatch,
) -> Result<OrderView, ServiceError> {
    let username = patch.username.as_deref().map(|v| validate::required_text("Username", v, 128)).transpose()?;
    let phone = patch.phone.as_deref().map(|v| validate::required_text("Phone", v, 32)).transpose()?;
    let address = patch.address.as_deref().map(|v| validate::required_text("Address", v, 512)).transpose()?;
    let lines = patch.items.as_deref().map(merge_lines).transpose()?;
    if patch.status == Some(OrderStatus::Cancelled) && lines.is_some() {
        return Err(ServiceError::invalid("Cannot replace items while cancelling"));
    }
    access::owned_store(db, store_id, user_id).await?;

    let txn = db.begin().await?;
    let current = locked_order(&txn, store_id, id).await?;
    let status = current.status()?;
    if status == OrderStatus::Cancelled {
        let only_recancel = patch.status == Some(OrderStatus::Cancelled)
            && username.is_none()
            && phone.is_none()
            && address.is_none()
            && patch.is_paid.is_none()
            && lines.is_none();
        if !only_recancel {
            return Err(ServiceError::conflict("Order is cancelled"));
        }
        let view = hydrate(&txn, vec![current]).await?.pop().ok_or_else(|| ServiceError::not_found("Order"))?;
        txn.commit().await?;
        return Ok(view);
    }
    if let Some(next) = patch.status {
        if !status.can_transition_to(next) {
            return Err(ServiceError::conflict(format!("Cannot move order from {status} to {next}")));
        }
    }
    if !claim_status(&txn, &current, patch.status.unwrap_or(status)).await? {
        warn!("order status changed underneath the update");
        return Err(ServiceError::conflict("Order was changed by another request"));
    }

    let mut units = 0i64;
    if let Some(lines) = &lines {
        let old = order_item::find_for_order(&txn, id).await?;
        units += return_stock(&txn, &old).await?;
        order_item::Entity::delete_many().filter(order_item::Column::OrderId.eq(id)).exec(&txn).await?;
        units += add_lines(&txn, store_id, id, lines, false).await?;
    }
    if patch.status == Some(OrderStatus::Cancelled) {
        let old = order_item::find_for_order(&txn, id).await?;
        units += return_stock(&txn, &old).await?;
    }

    let mut am: order::ActiveModel = current.into();
    if let Some(v) = username { am.username = Set(v); }
    if let Some(v) = phone { am.phone = Set(v); }
    if let Some(v) = address { am.address = Set(v); }
    if let Some(s) = patch.status { am.status = Set(s.as_str().to_string()); }
    if let Some(p) = patch.is_paid { am.is_paid = Set(p); }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(&txn).await?;
    let view = hydrate(&txn, vec![updated]).await?.pop().ok_or_else(|| ServiceError::not_found("Order"))?;
    txn.commit().await?;

    record_stock_moved(units);
    info!(status = %view.order.status, units, "order_updated");
    Ok(view)
}

/// Delete an order and its items. Stock is returned unless the order was already cancelled.
#[instrument(skip(db), fields(%store_id, %id))]
pub async fn delete_order(db: &DatabaseConnection, user_id: Uuid, store_id: Uuid, id: Uuid) -> Result<order::Model, ServiceError> {
    access::owned_store(db, store_id, user_id).await?;
    let txn = db.begin().await?;
    let found = locked_order(&txn, store_id, id).await?;
    let items = order_item::find_for_order(&txn, id).await?;
    // items go with the order row (cascade)
    let claimed = order::Entity::delete_many()
        .filter(order::Column::Id.eq(id))
        .filter(order::Column::Status.eq(found.status.as_str()))
        .exec(&txn)
        .await?;
    if claimed.rows_affected != 1 {
        return Err(ServiceError::conflict("Order was changed by another request"));
    }
    let units = match found.status() {
        Ok(OrderStatus::Cancelled) => 0,
        Ok(_) => return_stock(&txn, &items).await?,
        Err(e) => {
            warn!(error = %e, "order has unknown status; returning stock");
            return_stock(&txn, &items).await?
        }
    };
    txn.commit().await?;
    record_stock_moved(units);
    info!(units, "order_deleted");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::product_service::tests::{category, product_input};
    use crate::services::product_service::{create_product, ProductPatch};
    use crate::storage::mock::RecordingObjectStore;
    use crate::test_support::{get_db, seed_owner};

    fn order_for(items: Vec<(Uuid, i32)>) -> OrderInput {
        OrderInput {
            username: "Ada".into(),
            phone: "+1 555 0100".into(),
            address: "1 Main St".into(),
            is_paid: false,
            items: items.into_iter().map(|(product_id, quantity)| OrderItemInput { product_id, quantity }).collect(),
        }
    }

    async fn stock_of(db: &DatabaseConnection, id: Uuid) -> Result<i32, anyhow::Error> {
        Ok(product::Entity::find_by_id(id).one(db).await?.map(|p| p.stock).unwrap_or(-1))
    }

    #[test]
    fn duplicate_lines_merge() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let merged = merge_lines(&order_for(vec![(a, 1), (b, 2), (a, 3)]).items).unwrap();
        assert_eq!(merged, vec![(a, 4), (b, 2)]);
        assert!(merge_lines(&[]).is_err());
        assert!(merge_lines(&order_for(vec![(a, 0)]).items).is_err());
    }

    #[tokio::test]
    async fn create_takes_stock_and_snapshots_price() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let hats = category(&db, owner.id, shop.id, "Hats").await?;
        let cap = create_product(&db, owner.id, shop.id, product_input("Cap", hats.id, 1200, 5)).await?;
        let id = cap.product.id;

        let placed = create_order(&db, owner.id, shop.id, order_for(vec![(id, 2), (id, 1)])).await?;
        assert_eq!(placed.items.len(), 1);
        assert_eq!(placed.total_cents, 3600);
        assert_eq!(placed.order.status, "pending");
        assert_eq!(stock_of(&db, id).await?, 2);

        let objects = RecordingObjectStore::default();
        let patch = ProductPatch { price_cents: Some(9900), ..Default::default() };
        crate::services::product_service::update_product(&db, &objects, owner.id, shop.id, id, patch).await?;
        let again = get_order(&db, owner.id, shop.id, placed.order.id).await?;
        assert_eq!(again.items[0].item.unit_price_cents, 1200);
        Ok(())
    }

    #[tokio::test]
    async fn insufficient_stock_aborts_whole_order() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let hats = category(&db, owner.id, shop.id, "Hats").await?;
        let plenty = create_product(&db, owner.id, shop.id, product_input("Plenty", hats.id, 100, 10)).await?.product.id;
        let scarce = create_product(&db, owner.id, shop.id, product_input("Scarce", hats.id, 100, 1)).await?.product.id;

        let res = checkout(&db, shop.id, order_for(vec![(plenty, 3), (scarce, 2)])).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        assert_eq!(stock_of(&db, plenty).await?, 10);
        assert_eq!(stock_of(&db, scarce).await?, 1);
        assert!(list_orders(&db, owner.id, shop.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn checkout_rejects_archived_and_foreign_products() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let (other_owner, other) = seed_owner(&db, "other").await?;
        let hats = category(&db, owner.id, shop.id, "Hats").await?;
        let mut old = product_input("Old", hats.id, 100, 4);
        old.is_archived = true;
        let old = create_product(&db, owner.id, shop.id, old).await?.product.id;
        let foreign_cat = category(&db, other_owner.id, other.id, "Misc").await?;
        let foreign = create_product(&db, other_owner.id, other.id, product_input("Theirs", foreign_cat.id, 100, 4)).await?.product.id;

        assert!(matches!(checkout(&db, shop.id, order_for(vec![(old, 1)])).await, Err(ServiceError::Validation(_))));
        assert!(matches!(checkout(&db, shop.id, order_for(vec![(foreign, 1)])).await, Err(ServiceError::Validation(_))));
        // the dashboard may still sell archived stock
        create_order(&db, owner.id, shop.id, order_for(vec![(old, 1)])).await?;
        assert_eq!(stock_of(&db, old).await?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn cancel_restores_stock_once_and_is_terminal() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let hats = category(&db, owner.id, shop.id, "Hats").await?;
        let id = create_product(&db, owner.id, shop.id, product_input("Cap", hats.id, 100, 5)).await?.product.id;
        let placed = create_order(&db, owner.id, shop.id, order_for(vec![(id, 4)])).await?;
        assert_eq!(stock_of(&db, id).await?, 1);

        let cancel = || OrderPatch { status: Some(OrderStatus::Cancelled), ..Default::default() };
        let cancelled = update_order(&db, owner.id, shop.id, placed.order.id, cancel()).await?;
        assert_eq!(cancelled.order.status, "cancelled");
        assert_eq!(stock_of(&db, id).await?, 5);

        update_order(&db, owner.id, shop.id, placed.order.id, cancel()).await?;
        assert_eq!(stock_of(&db, id).await?, 5);

        let revive = OrderPatch { status: Some(OrderStatus::Pending), ..Default::default() };
        let res = update_order(&db, owner.id, shop.id, placed.order.id, revive).await;
        assert!(matches!(res, Err(ServiceError::Conflict(_))));

        delete_order(&db, owner.id, shop.id, placed.order.id).await?;
        assert_eq!(stock_of(&db, id).await?, 5);
        Ok(())
    }

    #[tokio::test]
    async fn status_claim_is_won_by_one_writer() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let hats = category(&db, owner.id, shop.id, "Hats").await?;
        let id = create_product(&db, owner.id, shop.id, product_input("Cap", hats.id, 100, 5)).await?.product.id;
        let placed = create_order(&db, owner.id, shop.id, order_for(vec![(id, 2)])).await?;

        // two writers that both read the order while it was pending
        let seen = placed.order.clone();
        assert!(claim_status(&db, &seen, OrderStatus::Cancelled).await?);
        assert!(!claim_status(&db, &seen, OrderStatus::Cancelled).await?);
        assert!(!claim_status(&db, &seen, OrderStatus::Shipped).await?);

        // the row is cancelled now; deleting it must not hand the units back
        let before = stock_of(&db, id).await?;
        delete_order(&db, owner.id, shop.id, placed.order.id).await?;
        assert_eq!(stock_of(&db, id).await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn replacing_items_moves_stock_atomically() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let hats = category(&db, owner.id, shop.id, "Hats").await?;
        let cap = create_product(&db, owner.id, shop.id, product_input("Cap", hats.id, 100, 5)).await?.product.id;
        let hat = create_product(&db, owner.id, shop.id, product_input("Hat", hats.id, 300, 2)).await?.product.id;
        let placed = create_order(&db, owner.id, shop.id, order_for(vec![(cap, 3)])).await?;

        let swap = OrderPatch { items: Some(order_for(vec![(cap, 1), (hat, 2)]).items), ..Default::default() };
        let updated = update_order(&db, owner.id, shop.id, placed.order.id, swap).await?;
        assert_eq!(updated.total_cents, 700);
        assert_eq!(stock_of(&db, cap).await?, 4);
        assert_eq!(stock_of(&db, hat).await?, 0);

        let too_many = OrderPatch { items: Some(order_for(vec![(hat, 3)]).items), ..Default::default() };
        let res = update_order(&db, owner.id, shop.id, placed.order.id, too_many).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        assert_eq!(stock_of(&db, cap).await?, 4);
        assert_eq!(stock_of(&db, hat).await?, 0);

        delete_order(&db, owner.id, shop.id, placed.order.id).await?;
        assert_eq!(stock_of(&db, cap).await?, 5);
        assert_eq!(stock_of(&db, hat).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn ordered_products_cannot_be_deleted() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (owner, shop) = seed_owner(&db, "owner").await?;
        let hats = category(&db, owner.id, shop.id, "Hats").await?;
        let id = create_product(&db, owner.id, shop.id, product_input("Cap", hats.id, 100, 5)).await?.product.id;
        create_order(&db, owner.id, shop.id, order_for(vec![(id, 1)])).await?;
        let objects = RecordingObjectStore::default();
        let res = crate::services::product_service::delete_product(&db, &objects, owner.id, shop.id, id).await;
        assert!(matches!(res, Err(ServiceError::Conflict(_))));
        Ok(())
    }
}
