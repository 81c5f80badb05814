use page_core::StartKey;
use serde_json::{Map, Value};

use crate::{IndexName, StoreError};

/// A stored item: a JSON object including its key attributes.
pub type Item = Map<String, Value>;

pub const PK: &str = "PK";
pub const SK: &str = "SK";
pub const GSI1PK: &str = "GSI1PK";
pub const GSI1SK: &str = "GSI1SK";
pub const GSI2PK: &str = "GSI2PK";
pub const GSI2SK: &str = "GSI2SK";

pub const KEY_ATTRIBUTES: [&str; 6] = [PK, SK, GSI1PK, GSI1SK, GSI2PK, GSI2SK];

/// Remove every key attribute, leaving only entity fields.
pub fn strip_keys(mut item: Item) -> Item {
    for attr in KEY_ATTRIBUTES {
        item.remove(attr);
    }
    item
}

/// String value of a key attribute, if present.
pub fn key_attr<'a>(item: &'a Item, attr: &str) -> Option<&'a str> {
    item.get(attr).and_then(Value::as_str)
}

pub(crate) fn required_key<'a>(item: &'a Item, attr: &'static str) -> Result<&'a str, StoreError> {
    key_attr(item, attr).ok_or(StoreError::MissingKey(attr))
}

/// Exclusive start key of `item` for a query against `index`: the primary key
/// plus the index's own key attributes.
pub fn start_key_of(item: &Item, index: IndexName) -> Option<StartKey> {
    let mut key = StartKey::new();
    for attr in [PK, SK]
        .into_iter()
        .chain(index.key_attrs().into_iter().flatten())
    {
        key.insert(attr.to_string(), key_attr(item, attr)?.to_string());
    }
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(v: Value) -> Item {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn strip_keys_removes_only_key_attributes() {
        let stripped = strip_keys(item(json!({
            "PK": "RECIPE", "SK": "RECIPE#1",
            "GSI1PK": "AUTHOR#a", "GSI1SK": "RECIPE#1",
            "GSI2PK": "CUISINE#UNKNOWN", "GSI2SK": "RECIPE#t",
            "title": "Soup"
        })));
        assert_eq!(Value::Object(stripped), json!({"title": "Soup"}));
    }

    #[test]
    fn start_key_includes_index_attributes() {
        let it = item(json!({
            "PK": "RECIPE", "SK": "RECIPE#1",
            "GSI1PK": "AUTHOR#a", "GSI1SK": "RECIPE#1"
        }));
        let key = start_key_of(&it, IndexName::Gsi1).unwrap();
        assert_eq!(key.len(), 4);
        assert_eq!(key["GSI1PK"], "AUTHOR#a");

        assert_eq!(start_key_of(&it, IndexName::Primary).unwrap().len(), 2);
        assert!(start_key_of(&it, IndexName::Gsi2).is_none());
    }
}
