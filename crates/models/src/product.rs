use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{category, errors::ModelError, image, slug, store, subcategory, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_id: Uuid,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub price_cents: i64,
    pub stock: i32,
    pub is_featured: bool,
    pub is_archived: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Store,
    Category,
    Subcategory,
    Image,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Store => Entity::belongs_to(store::Entity).from(Column::StoreId).to(store::Column::Id).into(),
            Relation::Category => Entity::belongs_to(category::Entity)
                .from(Column::CategoryId)
                .to(category::Column::Id)
                .into(),
            Relation::Subcategory => Entity::belongs_to(subcategory::Entity)
                .from(Column::SubcategoryId)
                .to(subcategory::Column::Id)
                .into(),
            Relation::Image => Entity::has_many(image::Entity).into(),
        }
    }
}

impl Related<image::Entity> for Entity {
    fn to() -> RelationDef { Relation::Image.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub struct NewProduct {
    pub store_id: Uuid,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
    pub price_cents: i64,
    pub stock: i32,
    pub is_featured: bool,
    pub is_archived: bool,
}

pub fn validate_name(name: &str) -> Result<String, ModelError> {
    validate::required_text("Name", name, 160)
}

pub fn validate_price(price_cents: i64) -> Result<(), ModelError> {
    validate::non_negative("Price", price_cents)
}

pub fn validate_stock(stock: i32) -> Result<(), ModelError> {
    validate::non_negative("Stock", i64::from(stock))
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewProduct) -> Result<Model, ModelError> {
    let name = validate_name(&new.name)?;
    let slug = slug::resolve_slug(new.slug.as_deref(), &name)?;
    validate_price(new.price_cents)?;
    validate_stock(new.stock)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        store_id: Set(new.store_id),
        category_id: Set(new.category_id),
        subcategory_id: Set(new.subcategory_id),
        name: Set(name),
        slug: Set(slug),
        description: Set(new.description.trim().to_string()),
        price_cents: Set(new.price_cents),
        stock: Set(new.stock),
        is_featured: Set(new.is_featured),
        is_archived: Set(new.is_archived),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}
