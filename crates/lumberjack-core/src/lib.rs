//! # lumberjack-core
//!
//! Typed client library for the Treeherder CI API.
//!
//! The same client serves async callers and plain blocking callers. Paged
//! list endpoints are aggregated transparently and job logs can be fetched
//! and searched line by line.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use lumberjack_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> lumberjack_core::Result<()> {
//!     let client = TreeherderClient::default();
//!
//!     let jobs = client
//!         .get_jobs("autoland", &JobFilter { count: 50, ..JobFilter::default() })
//!         .await?;
//!
//!     let matches = client
//!         .search_job_log("autoland", jobs[0].id, "TEST-UNEXPECTED", None, SearchOptions::with_context(2))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! Blocking callers go through [`api::client::TreeherderClient::blocking`]:
//!
//! ```rust,ignore
//! let repos = TreeherderClient::default().blocking().get_repositories()?;
//! ```
//!
//! ## Modules
//!
//! - [`api`]: HTTP client, URL building, pagination and response models
//! - [`core`]: Log resolution/search and the services built on the client
//! - [`storage`]: Configuration file and API key lookup
//! - [`utils`]: Validation, text formatting, error conversion
//! - [`display`]: Table rendering for terminal output
//! - [`error`]: Error taxonomy with troubleshooting hints

pub use error::AppError;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use lumberjack_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Result;
    pub use crate::error::{ApiError, AppError, ErrorKind};

    pub use crate::api::blocking::BlockingClient;
    pub use crate::api::client::{ClientConfig, TreeherderClient};
    pub use crate::api::endpoints::{
        AlertSummaryFilter, FailuresByBugFilter, JobFilter, PushFilter,
    };
    pub use crate::api::models::{Job, JobLogUrl, Push, Repository, ResultModel};

    pub use crate::core::log_search::{LogMatch, LogReference, SearchOptions};
    pub use crate::core::services::config_service::ConfigService;
    pub use crate::core::services::log_service::{JobLog, LogService};

    pub use crate::storage::config::Config;
    pub use crate::storage::credentials::{get_api_key, has_api_key};

    pub use crate::display::TableDisplay;
}

/// API layer - Treeherder HTTP client, endpoints and data models.
pub mod api;

/// Log resolution and search, plus the services used by the CLI.
pub mod core;

/// Storage layer - configuration file and credential lookup.
pub mod storage;

/// Shared helpers.
pub mod utils;

/// Terminal table output.
pub mod display;

/// Error handling - categorized errors with severity and hints.
pub mod error;

/// Convenient Result type alias using [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[doc(hidden)]
pub use api::client::TreeherderClient;
#[doc(hidden)]
pub use storage::config::Config;
