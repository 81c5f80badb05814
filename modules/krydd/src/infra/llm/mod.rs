mod http_client;
mod offline;

pub use http_client::{messages_body, HttpModelClient, HttpModelConfig, ANTHROPIC_VERSION};
pub use offline::OfflineModel;
