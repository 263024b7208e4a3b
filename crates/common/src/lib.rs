//! Minipress Common Library
//!
//! Shared code for the Minipress services including:
//! - Database models and repository patterns
//! - Contact submission validation
//! - Mail transport abstraction and notification dispatch
//! - Error types and handling
//! - Configuration management
//! - Admin capability policy
//! - Metrics and observability

pub mod admin;
pub mod config;
pub mod db;
pub mod errors;
pub mod mail;
pub mod metrics;
pub mod notify;
pub mod slug;
pub mod validation;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};
pub use notify::Notifier;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed page size for the public article list
pub const ARTICLE_PAGE_SIZE: u64 = 5;
