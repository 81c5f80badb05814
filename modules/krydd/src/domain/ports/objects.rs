use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObjectStoreError {
    #[error("invalid object key '{0}'")]
    InvalidKey(String),

    #[error("object store i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flat key → bytes store. Keys are `/`-separated paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), ObjectStoreError>;
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ObjectStoreError>;
    /// Keys starting with `prefix`, sorted.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, ObjectStoreError>;
    /// Returns whether an object existed.
    async fn delete(&self, key: &str) -> Result<bool, ObjectStoreError>;
}
