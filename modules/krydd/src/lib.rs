//! Krydd: recipes, weekly meal plans and a cooking assistant on top of a
//! single-table store.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::model;

pub mod config;
pub use config::KryddConfig;

// === MODULE DEFINITION ===
pub mod module;
pub use module::{Krydd, KryddDeps};

// === INTERNAL MODULES ===
// Exposed for the server binary and integration tests.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
