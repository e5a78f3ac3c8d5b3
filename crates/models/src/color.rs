use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors::ModelError, store, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "color")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub store_id: Uuid,
    pub name: String,
    /// `#rgb` or `#rrggbb`, stored lowercase.
    pub value: String,
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

pub fn validate_value(value: &str) -> Result<String, ModelError> {
    let v = value.trim().to_lowercase();
    let hex = v.strip_prefix('#').unwrap_or("");
    if !(hex.len() == 3 || hex.len() == 6) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ModelError::Validation("Value must be a hex color like #fff or #ffffff".into()));
    }
    Ok(v)
}

pub async fn create<C: ConnectionTrait>(db: &C, store_id: Uuid, name: &str, value: &str) -> Result<Model, ModelError> {
    let name = validate::required_text("Name", name, 64)?;
    let value = validate_value(value)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        store_id: Set(store_id),
        name: Set(name),
        value: Set(value),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::validate_value;

    #[test]
    fn hex_colors() {
        assert_eq!(validate_value(" #FFAA00 ").unwrap(), "#ffaa00");
        assert!(validate_value("#abc").is_ok());
        assert!(validate_value("abc").is_err());
        assert!(validate_value("#abcd").is_err());
        assert!(validate_value("#ggg").is_err());
    }
}
