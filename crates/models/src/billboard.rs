use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors::ModelError, store, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "billboard")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_id: Uuid,
    pub label: String,
    pub image_url: String,
    /// Site-wide promotional banner rather than a category header.
    pub is_banner: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Store,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Store => Entity::belongs_to(store::Entity).from(Column::StoreId).to(store::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_label(label: &str) -> Result<String, ModelError> {
    validate::required_text("Label", label, 128)
}

pub fn validate_image_url(url: &str) -> Result<String, ModelError> {
    validate::image_url("Image URL", url)
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    store_id: Uuid,
    label: &str,
    image_url: &str,
    is_banner: bool,
) -> Result<Model, ModelError> {
    let label = validate_label(label)?;
    let image_url = validate_image_url(image_url)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        label: Set(label),
        image_url: Set(image_url),
        is_banner: Set(is_banner),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}
