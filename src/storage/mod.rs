//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - users(username, name, social handles, profile images)
//! - organizations(username, name, slug, profile images)
//! - article_headers(id, listing metadata, username, org_name)
//! - article_bodies(id, body_html, body_markdown)

pub mod schema;
pub mod sqlite;
pub mod value;

pub use schema::{Field, FieldType, Schema};
pub use sqlite::SqliteStore;
pub use value::Value;
