use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors::ModelError, slug, store, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "news")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_id: Uuid,
    pub title: String,
    pub slug: String,
    /// Rich-text HTML from the dashboard editor, stored as-is.
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub image_url: Option<String>,
    pub is_published: bool,
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

pub struct NewNews {
    pub store_id: Uuid,
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub is_published: bool,
}

pub fn validate_image_url(url: Option<&str>) -> Result<Option<String>, ModelError> {
    match url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(u) => validate::image_url("Image URL", u).map(Some),
        None => Ok(None),
    }
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewNews) -> Result<Model, ModelError> {
    let title = validate::required_text("Title", &new.title, 200)?;
    let slug = slug::resolve_slug(new.slug.as_deref(), &title)?;
    if new.content.trim().is_empty() {
        return Err(ModelError::required("Content"));
    }
    let image_url = validate_image_url(new.image_url.as_deref())?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        store_id: Set(new.store_id),
        title: Set(title),
        slug: Set(slug),
        content: Set(new.content),
        image_url: Set(image_url),
        is_published: Set(new.is_published),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}
