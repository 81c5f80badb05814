pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod openapi;
pub mod routes;

pub use routes::{router, KryddServices};
