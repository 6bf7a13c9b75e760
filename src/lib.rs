//! # devscrape - dev.to article scraper
//!
//! Pages through the dev.to articles API and stores what it finds in SQLite.
//!
//! devscrape provides:
//! - A small record-mapping layer: explicit table schemas, row encoding and
//!   existence checks shared by every record kind
//! - SQLite-backed storage that skips records already present by unique key
//! - Listing flattening into user, organization and article header records
//! - A sequential scraper that fetches article bodies only when missing

pub mod api;
pub mod article;
pub mod author;
pub mod config;
pub mod flatten;
pub mod record;
pub mod scraper;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use api::{ArticleSource, DevToClient};
pub use article::{ArticleBody, ArticleHeader};
pub use author::{Organization, User};
pub use record::Record;
pub use scraper::{ScrapeOptions, ScrapeSummary, Scraper};
pub use storage::{SqliteStore, Value};

/// Result type alias for devscrape operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for devscrape operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Upstream answered with something other than 200 OK
    #[error("{status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Upstream JSON had an unexpected structure
    #[error("Unexpected shape: {0}")]
    Shape(String),

    #[error("Row for {table} has {found} values, expected {expected}")]
    ColumnMismatch {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
