mod fs;
mod memory;

pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;

use crate::domain::ports::ObjectStoreError;

/// Reject keys that could escape the store root.
fn check_key(key: &str) -> Result<(), ObjectStoreError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(ObjectStoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
