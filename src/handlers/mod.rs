pub mod app_config;
pub mod audit;
pub mod auth;
pub mod health;
