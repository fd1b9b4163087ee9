pub mod audit_repo;
pub mod config_entry_repo;
pub mod user_repo;
