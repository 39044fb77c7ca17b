pub mod blocking;
pub mod client;
pub mod endpoints;
pub mod models;
pub mod pagination;
pub mod url;
