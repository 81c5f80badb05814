use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use page_core::StartKey;

use crate::item::{key_attr, Item, GSI1PK, GSI1SK, GSI2PK, GSI2SK, PK, SK};
use crate::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexName {
    Primary,
    Gsi1,
    Gsi2,
}

impl IndexName {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexName::Primary => "primary",
            IndexName::Gsi1 => "gsi1",
            IndexName::Gsi2 => "gsi2",
        }
    }

    /// Partition and sort attribute names of the index.
    pub fn attrs(&self) -> (&'static str, &'static str) {
        match self {
            IndexName::Primary => (PK, SK),
            IndexName::Gsi1 => (GSI1PK, GSI1SK),
            IndexName::Gsi2 => (GSI2PK, GSI2SK),
        }
    }

    /// Secondary key attributes; `None` for the primary index.
    pub fn key_attrs(&self) -> Option<[&'static str; 2]> {
        match self {
            IndexName::Primary => None,
            IndexName::Gsi1 => Some([GSI1PK, GSI1SK]),
            IndexName::Gsi2 => Some([GSI2PK, GSI2SK]),
        }
    }

    /// Attributes that define the total order within one partition.
    pub fn order_attrs(&self) -> &'static [&'static str] {
        match self {
            IndexName::Primary => &[SK],
            IndexName::Gsi1 => &[GSI1SK, PK, SK],
            IndexName::Gsi2 => &[GSI2SK, PK, SK],
        }
    }

    /// Order tuple of `item` within this index, `None` when the item is not indexed.
    pub(crate) fn order_key<'a>(&self, item: &'a Item) -> Option<Vec<&'a str>> {
        self.order_attrs()
            .iter()
            .map(|attr| key_attr(item, attr))
            .collect()
    }

    pub(crate) fn start_order_key<'a>(
        &self,
        start: &'a StartKey,
    ) -> Result<Vec<&'a str>, StoreError> {
        self.order_attrs()
            .iter()
            .map(|attr| {
                start
                    .get(*attr)
                    .map(String::as_str)
                    .ok_or(StoreError::InvalidStartKey(*attr))
            })
            .collect()
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(IndexName::Primary),
            "gsi1" => Ok(IndexName::Gsi1),
            "gsi2" => Ok(IndexName::Gsi2),
            other => Err(format!("unknown index '{other}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimaryKey {
    pub pk: String,
    pub sk: String,
}

impl PrimaryKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }

    pub fn of(item: &Item) -> Result<Self, StoreError> {
        Ok(Self::new(
            crate::item::required_key(item, PK)?,
            crate::item::required_key(item, SK)?,
        ))
    }
}

#[derive(Clone, Debug)]
pub struct QueryRequest {
    pub index: IndexName,
    pub partition: String,
    pub sort_prefix: Option<String>,
    pub limit: Option<u64>,
    pub exclusive_start: Option<StartKey>,
    /// `false` returns the partition in descending sort-key order.
    pub scan_forward: bool,
}

impl QueryRequest {
    pub fn new(index: IndexName, partition: impl Into<String>) -> Self {
        Self {
            index,
            partition: partition.into(),
            sort_prefix: None,
            limit: None,
            exclusive_start: None,
            scan_forward: true,
        }
    }

    pub fn sort_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sort_prefix = Some(prefix.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn exclusive_start(mut self, start: Option<StartKey>) -> Self {
        self.exclusive_start = start;
        self
    }

    pub fn descending(mut self) -> Self {
        self.scan_forward = false;
        self
    }

    /// Whether `item` lies strictly after `start` in scan direction.
    pub(crate) fn is_after(&self, item_key: &[&str], start_key: &[&str]) -> bool {
        let ord = item_key.cmp(start_key);
        if self.scan_forward {
            ord == Ordering::Greater
        } else {
            ord == Ordering::Less
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct QueryOutput {
    pub items: Vec<Item>,
    /// Set when the limit cut the scan short.
    pub last_evaluated: Option<StartKey>,
}

/// Smallest string greater than every string starting with `prefix`, or `None`
/// when no such bound exists (empty prefix or all `char::MAX`).
pub fn prefix_upper_bound(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        let mut next = last as u32 + 1;
        // skip the surrogate gap
        if (0xD800..=0xDFFF).contains(&next) {
            next = 0xE000;
        }
        if let Some(c) = char::from_u32(next) {
            chars.push(c);
            return Some(chars.into_iter().collect());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_bound_increments_last_char() {
        assert_eq!(prefix_upper_bound("RECIPE#").as_deref(), Some("RECIPE$"));
        assert_eq!(prefix_upper_bound("").as_deref(), None);
        let bound = prefix_upper_bound("a").unwrap();
        assert!("a" < bound.as_str() && "azzzz" < bound.as_str());
    }

    #[test]
    fn index_names_round_trip_through_str() {
        for index in [IndexName::Primary, IndexName::Gsi1, IndexName::Gsi2] {
            assert_eq!(index.as_str().parse::<IndexName>().unwrap(), index);
        }
        assert!("gsi3".parse::<IndexName>().is_err());
    }
}
