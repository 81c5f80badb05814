pub mod model;
pub mod objects;

pub use model::{Completion, Invocation, LanguageModel, ModelError, ToolCall, ToolSpec};
pub use objects::{ObjectStore, ObjectStoreError};

use chrono::{DateTime, Utc};

/// Source of `createdAt`/`updatedAt` values.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of entity identifiers.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}
