//! Domain models and request/response DTOs

pub mod audit;
pub mod auth;
pub mod config_entry;
pub mod user;
