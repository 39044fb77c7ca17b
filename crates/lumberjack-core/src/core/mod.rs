pub mod log_search;
pub mod services;
