use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors::ModelError, product, service_offering, validate};

/// An image attached to exactly one product or one service.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "image")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
    pub url: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Product,
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Product => Entity::belongs_to(product::Entity)
                .from(Column::ProductId)
                .to(product::Column::Id)
                .into(),
            Relation::Service => Entity::belongs_to(service_offering::Entity)
                .from(Column::ServiceId)
                .to(service_offering::Column::Id)
                .into(),
        }
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef { Relation::Product.def() }
}

impl Related<service_offering::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    Product(Uuid),
    Service(Uuid),
}

pub async fn create<C: ConnectionTrait>(db: &C, owner: Owner, url: &str) -> Result<Model, ModelError> {
    let url = validate::image_url("Image URL", url)?;
    let (product_id, service_id) = match owner {
        Owner::Product(id) => (Some(id), None),
        Owner::Service(id) => (None, Some(id)),
    };
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        service_id: Set(service_id),
        url: Set(url),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn find_by_owner<C: ConnectionTrait>(db: &C, owner: Owner) -> Result<Vec<Model>, ModelError> {
    let filter = match owner {
        Owner::Product(id) => Column::ProductId.eq(id),
        Owner::Service(id) => Column::ServiceId.eq(id),
    };
    Ok(Entity::find().filter(filter).order_by_asc(Column::CreatedAt).all(db).await?)
}
