//! SQL-backed table (SQLite / Postgres through SeaORM).
//!
//! Sort order relies on byte-wise text comparison. SQLite compares `TEXT` with
//! `BINARY` by default; Postgres databases should be created with the `C`
//! collation.

pub mod entity;
pub mod migrations;

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectOptions, Database, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::item::{key_attr, start_key_of, Item, GSI1PK, GSI1SK, GSI2PK, GSI2SK};
use crate::query::{prefix_upper_bound, IndexName, PrimaryKey, QueryOutput, QueryRequest};
use crate::{StoreError, TableStore};

use entity::{ActiveModel, Column, Entity, Model};
use migrations::Migrator;

pub struct SeaOrmTable {
    db: DatabaseConnection,
}

impl SeaOrmTable {
    /// Connect to `url` and run pending migrations.
    pub async fn connect(url: &str, max_conns: u32) -> Result<Self, StoreError> {
        let mut opts = ConnectOptions::new(url.to_owned());
        opts.max_connections(max_conns)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);
        // every connection to an in-memory SQLite database sees its own database
        if url.starts_with("sqlite::memory:") {
            opts.min_connections(1).max_connections(1);
        }

        let db = Database::connect(opts).await?;
        let table = Self::from_connection(db).await?;
        info!(url = %redact(url), "table store connected");
        Ok(table)
    }

    /// Wrap an existing connection, migrating it first.
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self, StoreError> {
        Migrator::up(&db, None).await?;
        Ok(Self { db })
    }
}

fn redact(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut u) if u.password().is_some() => {
            let _ = u.set_password(Some("***"));
            u.to_string()
        }
        _ => url.to_string(),
    }
}

fn index_columns(index: IndexName) -> (Column, Column) {
    match index {
        IndexName::Primary => (Column::Pk, Column::Sk),
        IndexName::Gsi1 => (Column::Gsi1pk, Column::Gsi1sk),
        IndexName::Gsi2 => (Column::Gsi2pk, Column::Gsi2sk),
    }
}

fn order_columns(index: IndexName) -> Vec<Column> {
    match index {
        IndexName::Primary => vec![Column::Sk],
        IndexName::Gsi1 => vec![Column::Gsi1sk, Column::Pk, Column::Sk],
        IndexName::Gsi2 => vec![Column::Gsi2sk, Column::Pk, Column::Sk],
    }
}

/// Rows strictly after `start` in scan order.
/// Ascending: (k0 > v0) OR (k0 = v0 AND k1 > v1) OR ...
/// Descending uses `<` in place of `>`.
fn after_condition(cols: &[Column], start: &[&str], forward: bool) -> Condition {
    let mut any = Condition::any();
    for i in 0..cols.len() {
        let mut all = Condition::all();
        for (col, value) in cols.iter().zip(start).take(i) {
            all = all.add(col.eq(*value));
        }
        let cmp = if forward {
            cols[i].gt(start[i])
        } else {
            cols[i].lt(start[i])
        };
        any = any.add(all.add(cmp));
    }
    any
}

fn to_active_model(item: &Item) -> Result<ActiveModel, StoreError> {
    let key = PrimaryKey::of(item)?;
    let owned = |attr: &str| key_attr(item, attr).map(str::to_owned);
    Ok(ActiveModel {
        pk: Set(key.pk),
        sk: Set(key.sk),
        gsi1pk: Set(owned(GSI1PK)),
        gsi1sk: Set(owned(GSI1SK)),
        gsi2pk: Set(owned(GSI2PK)),
        gsi2sk: Set(owned(GSI2SK)),
        body: Set(serde_json::to_string(item)?),
    })
}

fn decode(model: &Model) -> Result<Item, StoreError> {
    Ok(serde_json::from_str(&model.body)?)
}

#[async_trait]
impl TableStore for SeaOrmTable {
    async fn get(&self, key: &PrimaryKey) -> Result<Option<Item>, StoreError> {
        let row = Entity::find_by_id((key.pk.clone(), key.sk.clone()))
            .one(&self.db)
            .await?;
        row.as_ref().map(decode).transpose()
    }

    async fn put(&self, item: Item) -> Result<(), StoreError> {
        let model = to_active_model(&item)?;
        Entity::insert(model)
            .on_conflict(
                OnConflict::columns([Column::Pk, Column::Sk])
                    .update_columns([
                        Column::Gsi1pk,
                        Column::Gsi1sk,
                        Column::Gsi2pk,
                        Column::Gsi2sk,
                        Column::Body,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &PrimaryKey) -> Result<Option<Item>, StoreError> {
        let id = (key.pk.clone(), key.sk.clone());
        let Some(existing) = Entity::find_by_id(id.clone()).one(&self.db).await? else {
            return Ok(None);
        };
        Entity::delete_by_id(id).exec(&self.db).await?;
        decode(&existing).map(Some)
    }

    async fn query(&self, req: QueryRequest) -> Result<QueryOutput, StoreError> {
        let (pk_col, sk_col) = index_columns(req.index);
        let cols = order_columns(req.index);

        let mut select = Entity::find()
            .filter(pk_col.eq(req.partition.as_str()))
            .filter(sk_col.is_not_null());

        if let Some(prefix) = req.sort_prefix.as_deref().filter(|p| !p.is_empty()) {
            select = select.filter(sk_col.gte(prefix));
            if let Some(upper) = prefix_upper_bound(prefix) {
                select = select.filter(sk_col.lt(upper));
            }
        }

        if let Some(start) = &req.exclusive_start {
            let values = req.index.start_order_key(start)?;
            select = select.filter(after_condition(&cols, &values, req.scan_forward));
        }

        for col in &cols {
            select = if req.scan_forward {
                select.order_by_asc(*col)
            } else {
                select.order_by_desc(*col)
            };
        }

        // one extra row tells whether the limit cut the scan short
        if let Some(limit) = req.limit {
            select = select.limit(limit.saturating_add(1));
        }

        let rows = select.all(&self.db).await?;
        debug!(index = %req.index, partition = %req.partition, rows = rows.len(), "query");

        let mut items = rows.iter().map(decode).collect::<Result<Vec<_>, _>>()?;
        let mut last_evaluated = None;
        if let Some(limit) = req.limit {
            if items.len() as u64 > limit {
                items.truncate(limit as usize);
                last_evaluated = items.last().and_then(|last| start_key_of(last, req.index));
            }
        }

        Ok(QueryOutput {
            items,
            last_evaluated,
        })
    }
}
