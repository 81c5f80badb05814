//! Table-backed repositories. Each repository is the only code path that
//! reads or writes its entity type; they share the encode/decode and paging
//! helpers below.

pub mod keys;
mod meal_plans;
mod recipes;
mod users;

pub use meal_plans::TableMealPlansRepository;
pub use recipes::TableRecipesRepository;
pub use users::TableUsersRepository;

use chrono::{DateTime, Duration, Utc};
use page_core::{clamp_limit, CursorV1, LimitCfg, Page};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use table_store::{start_key_of, strip_keys, IndexName, Item, PrimaryKey, QueryRequest, TableStore};
use tracing::warn;

use crate::contract::model::PageRequest;
use crate::domain::error::DomainError;
use crate::domain::validation::ValidationError;

use self::keys::KeySet;

type Validator<T> = fn(&T) -> Result<(), ValidationError>;

/// Serialize `entity` and attach its key attributes.
fn to_item<T: Serialize>(entity: &T, keys: &KeySet) -> Result<Item, DomainError> {
    match serde_json::to_value(entity).map_err(DomainError::store)? {
        Value::Object(mut item) => {
            keys.apply(&mut item);
            Ok(item)
        }
        _ => Err(DomainError::store("entity did not serialize to an object")),
    }
}

/// Strip key attributes, decode and validate. Corrupt items come back as
/// `None`, the same as absence, but are logged.
fn from_item<T: DeserializeOwned>(item: Item, entity: &'static str, validate: Validator<T>) -> Option<T> {
    let key = PrimaryKey::of(&item).ok();
    let decoded = serde_json::from_value::<T>(Value::Object(strip_keys(item)))
        .map_err(|e| e.to_string())
        .and_then(|v| validate(&v).map(|_| v).map_err(|e| e.to_string()));
    match decoded {
        Ok(v) => Some(v),
        Err(error) => {
            warn!(
                corrupt = true,
                entity,
                key = ?key,
                %error,
                "stored item failed decoding; treating as not found"
            );
            None
        }
    }
}

/// Next `updatedAt`: the current time, bumped past `previous` when the clock
/// has not advanced.
fn next_updated_at(now: DateTime<Utc>, previous: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

/// One index listing: partition equality plus a sort-key prefix.
struct Listing {
    index: IndexName,
    partition: String,
    sort_prefix: &'static str,
    descending: bool,
    limits: LimitCfg,
}

impl Listing {
    fn new(index: IndexName, partition: String, sort_prefix: &'static str, limits: LimitCfg) -> Self {
        Self {
            index,
            partition,
            sort_prefix,
            descending: false,
            limits,
        }
    }

    fn descending(mut self) -> Self {
        self.descending = true;
        self
    }
}

/// Run `listing` with the over-fetch convention: ask for `limit + 1` rows, keep
/// `limit`, and emit a cursor at the last kept row when the extra row exists.
async fn query_page<T: DeserializeOwned>(
    store: &dyn TableStore,
    listing: Listing,
    page: PageRequest,
    entity: &'static str,
    validate: Validator<T>,
) -> Result<Page<T>, DomainError> {
    let limit = clamp_limit(page.limit, listing.limits);
    let start = page
        .cursor
        .as_deref()
        .map(|c| CursorV1::decode_for(c, listing.index.as_str(), &listing.partition))
        .transpose()?;

    let mut req = QueryRequest::new(listing.index, listing.partition.clone())
        .sort_prefix(listing.sort_prefix)
        .limit(limit + 1)
        .exclusive_start(start);
    if listing.descending {
        req = req.descending();
    }

    let rows = store.query(req).await?.items;
    let page = Page::from_overfetch(rows, limit, |last| {
        start_key_of(last, listing.index)
            .map(|key| CursorV1::new(listing.index.as_str(), &listing.partition, key).encode())
    });
    Ok(page.filter_map_items(|item| from_item(item, entity, validate)))
}
