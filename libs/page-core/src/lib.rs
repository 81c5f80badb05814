//! Opaque cursors and page envelopes for keyset-paginated index queries.
//!
//! A list operation over-fetches one row (`limit + 1`). When the extra row is
//! present the page is trimmed back to `limit` and a [`CursorV1`] is emitted
//! that points at the last row handed to the caller. The cursor is resumed as
//! an exclusive start position on the next call.

mod cursor;
mod limit;
mod page;

pub use cursor::{base64_url, CursorV1, StartKey};
pub use limit::{clamp_limit, LimitCfg};
pub use page::{Page, PageInfo};

/// Cursor and paging errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid base64 in cursor")]
    CursorInvalidBase64,
    #[error("malformed cursor")]
    CursorInvalidJson,
    #[error("unsupported cursor version")]
    CursorInvalidVersion,
    #[error("cursor has no key attributes")]
    CursorInvalidKeys,
    #[error("cursor has no index name")]
    CursorInvalidIndex,
    #[error("cursor was issued for a different listing")]
    CursorMismatch,
}

impl Error {
    /// Stable machine code used by the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            Error::CursorInvalidBase64 => "CURSOR_INVALID_BASE64",
            Error::CursorInvalidJson => "CURSOR_INVALID_JSON",
            Error::CursorInvalidVersion => "CURSOR_INVALID_VERSION",
            Error::CursorInvalidKeys => "CURSOR_INVALID_KEYS",
            Error::CursorInvalidIndex => "CURSOR_INVALID_INDEX",
            Error::CursorMismatch => "CURSOR_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests;
