pub mod config_service;
pub mod log_service;
