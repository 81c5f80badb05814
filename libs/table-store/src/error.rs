use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item is missing key attribute '{0}'")]
    MissingKey(&'static str),

    #[error("exclusive start key is missing attribute '{0}'")]
    InvalidStartKey(&'static str),

    #[error("stored item could not be decoded: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "sea-orm")]
impl From<sea_orm::DbErr> for StoreError {
    fn from(e: sea_orm::DbErr) -> Self {
        StoreError::Backend(e.to_string())
    }
}
