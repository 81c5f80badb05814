pub mod error;
pub mod ports;
pub mod repo;
pub mod search;
pub mod service;
pub mod validation;
