//! Process runtime shared by Krydd binaries: layered configuration and
//! logging setup.

pub mod config;
pub mod home_dir;
pub mod logging;

pub use config::{AppConfig, CliArgs, LoggingConfig, ModelConfig, ObjectBackend, ObjectsConfig, StorageConfig};
pub use logging::init_logging_from_config;
