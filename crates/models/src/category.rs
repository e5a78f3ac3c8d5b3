use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{billboard, errors::ModelError, slug, store, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub billboard_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Store,
    Parent,
    Billboard,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Store => Entity::belongs_to(store::Entity).from(Column::StoreId).to(store::Column::Id).into(),
            Relation::Parent => Entity::belongs_to(Entity).from(Column::ParentId).to(Column::Id).into(),
            Relation::Billboard => Entity::belongs_to(billboard::Entity)
                .from(Column::BillboardId)
                .to(billboard::Column::Id)
                .into(),
        }
    }
}

impl Related<billboard::Entity> for Entity {
    fn to() -> RelationDef { Relation::Billboard.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub struct NewCategory {
    pub store_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub billboard_id: Option<Uuid>,
    pub name: String,
    pub slug: Option<String>,
}

pub fn validate_name(name: &str) -> Result<String, ModelError> {
    validate::required_text("Name", name, 128)
}

/// Inserts without checking references; callers verify store ownership and tree shape first.
pub async fn create<C: ConnectionTrait>(db: &C, new: NewCategory) -> Result<Model, ModelError> {
    let name = validate_name(&new.name)?;
    let slug = slug::resolve_slug(new.slug.as_deref(), &name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        store_id: Set(new.store_id),
        parent_id: Set(new.parent_id),
        billboard_id: Set(new.billboard_id),
        name: Set(name),
        slug: Set(slug),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}
