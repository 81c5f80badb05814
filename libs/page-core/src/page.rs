use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub next_cursor: Option<String>,
    pub limit: u64,
}

#[cfg_attr(feature = "with-utoipa", derive(utoipa::ToSchema))]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    /// Create a new page with items and page info
    pub fn new(items: Vec<T>, page_info: PageInfo) -> Self {
        Self { items, page_info }
    }

    /// Trim an over-fetched result set (`limit + 1` rows) and derive the next cursor
    /// from the last row that is kept.
    pub fn from_overfetch(
        mut rows: Vec<T>,
        limit: u64,
        cursor_for: impl FnOnce(&T) -> Option<String>,
    ) -> Self {
        let has_more = (rows.len() as u64) > limit;
        if has_more {
            rows.truncate(limit as usize);
        }
        let next_cursor = if has_more {
            rows.last().and_then(cursor_for)
        } else {
            None
        };
        Self {
            items: rows,
            page_info: PageInfo { next_cursor, limit },
        }
    }

    /// Convert items, dropping the ones `f` rejects. `page_info` is kept as is.
    pub fn filter_map_items<U>(self, f: impl FnMut(T) -> Option<U>) -> Page<U> {
        Page {
            items: self.items.into_iter().filter_map(f).collect(),
            page_info: self.page_info,
        }
    }

    /// Drop items that fail the predicate. The cursor is kept: it marks a store
    /// position, not a count of returned items.
    pub fn retain_items(mut self, f: impl FnMut(&T) -> bool) -> Self {
        self.items.retain(f);
        self
    }
}
