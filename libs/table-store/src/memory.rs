use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::item::{start_key_of, Item};
use crate::query::{PrimaryKey, QueryOutput, QueryRequest};
use crate::{StoreError, TableStore};

/// Ordered in-process table. Secondary indexes are evaluated on read by
/// scanning the items that carry the index attributes.
#[derive(Default)]
pub struct InMemoryTable {
    items: RwLock<BTreeMap<PrimaryKey, Item>>,
}

impl InMemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Synchronous write, also used to seed items directly in tests.
    pub fn insert_raw(&self, item: Item) -> Result<(), StoreError> {
        let key = PrimaryKey::of(&item)?;
        self.items.write().insert(key, item);
        Ok(())
    }
}

#[async_trait]
impl TableStore for InMemoryTable {
    async fn get(&self, key: &PrimaryKey) -> Result<Option<Item>, StoreError> {
        Ok(self.items.read().get(key).cloned())
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        self.insert_raw(item)
    }

    async fn delete(&self, key: &PrimaryKey) -> Result<Option<Item>, StoreError> {
        Ok(self.items.write().remove(key))
    }

    async fn query(&self, req: QueryRequest) -> Result<QueryOutput, StoreError> {
        let (pk_attr, sk_attr) = req.index.attrs();
        let start = match &req.exclusive_start {
            Some(start) => Some(req.index.start_order_key(start)?),
            None => None,
        };

        let guard = self.items.read();
        let mut matched: Vec<(Vec<&str>, &Item)> = guard
            .values()
            .filter(|item| crate::item::key_attr(item, pk_attr) == Some(req.partition.as_str()))
            .filter(|item| match (&req.sort_prefix, crate::item::key_attr(item, sk_attr)) {
                (Some(prefix), Some(sk)) => sk.starts_with(prefix.as_str()),
                (None, Some(_)) => true,
                (_, None) => false,
            })
            .filter_map(|item| req.index.order_key(item).map(|k| (k, item)))
            .collect();

        matched.sort_by(|a, b| a.0.cmp(&b.0));
        if !req.scan_forward {
            matched.reverse();
        }

        let mut remaining = matched
            .into_iter()
            .filter(|(k, _)| match &start {
                Some(s) => req.is_after(k, s),
                None => true,
            })
            .map(|(_, item)| item)
            .peekable();

        let limit = req.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let mut items = Vec::new();
        while items.len() < limit {
            match remaining.next() {
                Some(item) => items.push(item.clone()),
                None => break,
            }
        }

        let last_evaluated = if remaining.peek().is_some() {
            items.last().and_then(|last| start_key_of(last, req.index))
        } else {
            None
        };

        Ok(QueryOutput {
            items,
            last_evaluated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndexName;
    use serde_json::json;

    fn recipe(id: &str, author: &str, created: &str) -> Item {
        json!({
            "PK": "RECIPE",
            "SK": format!("RECIPE#{id}"),
            "GSI1PK": format!("AUTHOR#{author}"),
            "GSI1SK": format!("RECIPE#{id}"),
            "GSI2PK": "CUISINE#UNKNOWN",
            "GSI2SK": format!("RECIPE#{created}"),
            "id": id,
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn ids(out: &QueryOutput) -> Vec<&str> {
        out.items
            .iter()
            .map(|i| i["id"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn put_overwrites_and_delete_returns_old_item() {
        let table = InMemoryTable::new();
        table.put(recipe("1", "a", "t1")).await.unwrap();
        table.put(recipe("1", "b", "t1")).await.unwrap();
        assert_eq!(table.len(), 1);

        let key = PrimaryKey::new("RECIPE", "RECIPE#1");
        let got = table.get(&key).await.unwrap().unwrap();
        assert_eq!(got["GSI1PK"], "AUTHOR#b");

        assert!(table.delete(&key).await.unwrap().is_some());
        assert!(table.delete(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_without_primary_key_is_rejected() {
        let table = InMemoryTable::new();
        let item = json!({"SK": "X"}).as_object().cloned().unwrap();
        assert!(matches!(
            table.put(item).await,
            Err(StoreError::MissingKey("PK"))
        ));
    }

    #[tokio::test]
    async fn gsi_query_filters_partition_and_pages_with_start_key() {
        let table = InMemoryTable::new();
        for (id, author) in [("1", "a"), ("2", "b"), ("3", "a"), ("4", "a")] {
            table.put(recipe(id, author, id)).await.unwrap();
        }

        let first = table
            .query(QueryRequest::new(IndexName::Gsi1, "AUTHOR#a").limit(2))
            .await
            .unwrap();
        assert_eq!(ids(&first), vec!["1", "3"]);
        assert!(first.last_evaluated.is_some());

        let second = table
            .query(
                QueryRequest::new(IndexName::Gsi1, "AUTHOR#a")
                    .limit(2)
                    .exclusive_start(first.last_evaluated),
            )
            .await
            .unwrap();
        assert_eq!(ids(&second), vec!["4"]);
        assert!(second.last_evaluated.is_none());
    }

    #[tokio::test]
    async fn descending_query_with_sort_prefix() {
        let table = InMemoryTable::new();
        for id in ["1", "2", "3"] {
            table.put(recipe(id, "a", id)).await.unwrap();
        }
        let mut other = recipe("9", "a", "9");
        other.insert("SK".into(), json!("OTHER#9"));
        other.insert("PK".into(), json!("RECIPE"));
        table.put(other).await.unwrap();

        let out = table
            .query(
                QueryRequest::new(IndexName::Primary, "RECIPE")
                    .sort_prefix("RECIPE#")
                    .descending(),
            )
            .await
            .unwrap();
        assert_eq!(ids(&out), vec!["3", "2", "1"]);
    }

    #[tokio::test]
    async fn start_key_missing_order_attribute_is_rejected() {
        let table = InMemoryTable::new();
        let mut start = page_core::StartKey::new();
        start.insert("PK".into(), "RECIPE".into());
        let res = table
            .query(QueryRequest::new(IndexName::Gsi1, "AUTHOR#a").exclusive_start(Some(start)))
            .await;
        assert!(matches!(res, Err(StoreError::InvalidStartKey("GSI1SK"))));
    }
}
