use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{errors::ModelError, product, size, validate};

/// Links a product to a size, optionally overriding price and stock for that variant.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_size")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub size_id: Uuid,
    pub price_cents: Option<i64>,
    pub stock: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Product,
    Size,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Product => Entity::belongs_to(product::Entity)
                .from(Column::ProductId)
                .to(product::Column::Id)
                .into(),
            Relation::Size => Entity::belongs_to(size::Entity)
                .from(Column::SizeId)
                .to(size::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    size_id: Uuid,
    price_cents: Option<i64>,
    stock: Option<i32>,
) -> Result<Model, ModelError> {
    if let Some(p) = price_cents {
        validate::non_negative("Price", p)?;
    }
    if let Some(s) = stock {
        validate::non_negative("Stock", i64::from(s))?;
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        size_id: Set(size_id),
        price_cents: Set(price_cents),
        stock: Set(stock),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}
