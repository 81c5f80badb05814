#![cfg(feature = "sea-orm")]

use serde_json::{json, Value};
use table_store::sql::SeaOrmTable;
use table_store::{IndexName, Item, PrimaryKey, QueryRequest, StoreError, TableStore};

async fn table() -> SeaOrmTable {
    SeaOrmTable::connect("sqlite::memory:", 1)
        .await
        .expect("sqlite in-memory connect")
}

fn item(v: Value) -> Item {
    v.as_object().cloned().unwrap()
}

fn plan(user: &str, week: &str) -> Item {
    item(json!({
        "PK": format!("USER#{user}"),
        "SK": format!("MEALPLAN#{week}"),
        "GSI1PK": format!("MEALPLAN#{week}"),
        "GSI1SK": format!("USER#{user}"),
        "userId": user,
        "weekStartDate": week,
    }))
}

fn weeks(items: &[Item]) -> Vec<&str> {
    items
        .iter()
        .map(|i| i["weekStartDate"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn put_get_delete_round_trip() {
    let t = table().await;
    let p = plan("u1", "2024-01-01");
    t.put(p.clone()).await.unwrap();

    let key = PrimaryKey::new("USER#u1", "MEALPLAN#2024-01-01");
    assert_eq!(t.get(&key).await.unwrap(), Some(p.clone()));

    let mut changed = p;
    changed.insert("note".into(), json!("second"));
    t.put(changed.clone()).await.unwrap();
    assert_eq!(t.get(&key).await.unwrap(), Some(changed));

    assert!(t.delete(&key).await.unwrap().is_some());
    assert!(t.delete(&key).await.unwrap().is_none());
    assert!(t.get(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn primary_query_descending_pages_through_partition() {
    let t = table().await;
    for week in ["2024-01-01", "2024-01-08", "2024-01-15", "2024-01-22"] {
        t.put(plan("u1", week)).await.unwrap();
    }
    t.put(plan("u2", "2024-01-29")).await.unwrap();

    let req = || {
        QueryRequest::new(IndexName::Primary, "USER#u1")
            .sort_prefix("MEALPLAN#")
            .limit(3)
            .descending()
    };
    let first = t.query(req()).await.unwrap();
    assert_eq!(
        weeks(&first.items),
        vec!["2024-01-22", "2024-01-15", "2024-01-08"]
    );
    let start = first.last_evaluated.expect("more rows remain");

    let second = t.query(req().exclusive_start(Some(start))).await.unwrap();
    assert_eq!(weeks(&second.items), vec!["2024-01-01"]);
    assert!(second.last_evaluated.is_none());
}

#[tokio::test]
async fn secondary_index_query_skips_unindexed_items() {
    let t = table().await;
    t.put(plan("u2", "2024-01-01")).await.unwrap();
    t.put(plan("u1", "2024-01-01")).await.unwrap();
    t.put(item(json!({"PK": "USER", "SK": "USER#a@b.c", "email": "a@b.c"})))
        .await
        .unwrap();

    let out = t
        .query(QueryRequest::new(IndexName::Gsi1, "MEALPLAN#2024-01-01"))
        .await
        .unwrap();
    let users: Vec<_> = out
        .items
        .iter()
        .map(|i| i["userId"].as_str().unwrap())
        .collect();
    assert_eq!(users, vec!["u1", "u2"]);

    let none = t
        .query(QueryRequest::new(IndexName::Gsi2, "MEALPLAN#2024-01-01"))
        .await
        .unwrap();
    assert!(none.items.is_empty());
}

#[tokio::test]
async fn put_requires_primary_key() {
    let t = table().await;
    let res = t.put(item(json!({"PK": "USER"}))).await;
    assert!(matches!(res, Err(StoreError::MissingKey("SK"))));
}
