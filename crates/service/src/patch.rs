//! Helpers for PATCH bodies.

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
/// Use with `#[serde(default, deserialize_with = "crate::patch::nullable")]`.
pub fn nullable<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use uuid::Uuid;

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Body {
        #[serde(default, deserialize_with = "super::nullable")]
        parent_id: Option<Option<Uuid>>,
    }

    #[test]
    fn absent_null_and_value() {
        let absent: Body = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.parent_id, None);
        let null: Body = serde_json::from_str(r#"{"parentId": null}"#).unwrap();
        assert_eq!(null.parent_id, Some(None));
        let id = Uuid::new_v4();
        let set: Body = serde_json::from_str(&format!(r#"{{"parentId": "{id}"}}"#)).unwrap();
        assert_eq!(set.parent_id, Some(Some(id)));
    }
}
