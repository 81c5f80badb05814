//! Single-table store: one keyspace addressed by `(PK, SK)` with two sparse
//! global secondary indexes (`GSI1PK/GSI1SK`, `GSI2PK/GSI2SK`).
//!
//! Items are JSON objects that carry their own key attributes. An item takes
//! part in a secondary index only when it carries both attributes of it.

mod error;
mod item;
mod memory;
mod query;

#[cfg(feature = "sea-orm")]
pub mod sql;

pub use error::StoreError;
pub use item::{
    key_attr, start_key_of, strip_keys, Item, GSI1PK, GSI1SK, GSI2PK, GSI2SK, KEY_ATTRIBUTES, PK,
    SK,
};
pub use memory::InMemoryTable;
pub use page_core::StartKey;
pub use query::{prefix_upper_bound, IndexName, PrimaryKey, QueryOutput, QueryRequest};

use async_trait::async_trait;

/// Store client port. Writes are unconditional; there is no transaction or
/// conditional-write support.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Point lookup by primary key.
    async fn get(&self, key: &PrimaryKey) -> Result<Option<Item>, StoreError>;

    /// Full overwrite of the item at the item's own primary key.
    async fn put(&self, item: Item) -> Result<(), StoreError>;

    /// Delete by primary key, returning the item that was removed.
    async fn delete(&self, key: &PrimaryKey) -> Result<Option<Item>, StoreError>;

    /// Partition-equality + sort-prefix query against one index.
    async fn query(&self, req: QueryRequest) -> Result<QueryOutput, StoreError>;
}
