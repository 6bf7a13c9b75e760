//! Database schema definitions
//!
//! Each record kind is described once by a [`Schema`]: table name, ordered
//! fields with their types, the unique key and the table DDL. Table
//! creation, insert statements and existence checks are all derived from it.

use rusqlite::{Connection, OptionalExtension};

use super::value::Value;
use crate::Result;

/// Semantic type of a declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Integer,
    Timestamp,
}

impl FieldType {
    /// Get the SQLite column type name
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Integer => "INTEGER",
            FieldType::Timestamp => "TIMESTAMP",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A declared field: column name plus semantic type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
}

impl Field {
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }

    const fn text(name: &'static str) -> Self {
        Self::new(name, FieldType::Text)
    }

    const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    const fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldType::Timestamp)
    }
}

/// Table layout of one record kind
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub table: &'static str,
    /// Fields in declaration order; row values follow this order
    pub fields: &'static [Field],
    /// Field used for existence checks and natural-key references
    pub unique: Option<&'static str>,
    pub create_sql: &'static str,
}

impl Schema {
    /// Column names in declaration order
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Position of a field in the row
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn unique_index(&self) -> Option<usize> {
        self.unique.and_then(|name| self.index_of(name))
    }

    /// Run the table DDL. Safe to repeat.
    pub fn create_table(&self, conn: &Connection) -> Result<()> {
        conn.execute(self.create_sql, [])?;
        Ok(())
    }

    /// Parameterized insert naming every declared column
    pub fn insert_statement(&self) -> String {
        let columns = self.columns().collect::<Vec<_>>().join(", ");
        let placeholders = (1..=self.fields.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table, columns, placeholders
        )
    }

    /// Existence query on the unique column, if the kind has one
    pub fn exists_statement(&self) -> Option<String> {
        self.unique
            .map(|column| format!("SELECT 1 FROM {} WHERE {} = ?1", self.table, column))
    }

    /// Check whether a row with the given unique-key value is stored.
    ///
    /// Kinds without a unique key never report a match, and neither does a
    /// null key.
    pub fn exists(&self, conn: &Connection, key: &Value) -> Result<bool> {
        let Some(sql) = self.exists_statement() else {
            return Ok(false);
        };
        if key.is_null() {
            return Ok(false);
        }
        let found = conn
            .query_row(&sql, [key], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }
}

pub const USERS: Schema = Schema {
    table: "users",
    fields: &[
        Field::text("username"),
        Field::text("name"),
        Field::text("twitter_user_name"),
        Field::text("github_user_name"),
        Field::text("website_url"),
        Field::text("profile_image"),
        Field::text("profile_image_90"),
    ],
    unique: Some("username"),
    create_sql: r#"
CREATE TABLE IF NOT EXISTS users (
    username TEXT UNIQUE,
    name TEXT,
    twitter_user_name TEXT,
    github_user_name TEXT,
    website_url TEXT,
    profile_image TEXT,
    profile_image_90 TEXT
)
"#,
};

pub const ORGANIZATIONS: Schema = Schema {
    table: "organizations",
    fields: &[
        Field::text("username"),
        Field::text("name"),
        Field::text("slug"),
        Field::text("profile_image"),
        Field::text("profile_image_90"),
    ],
    unique: Some("username"),
    create_sql: r#"
CREATE TABLE IF NOT EXISTS organizations (
    username TEXT UNIQUE,
    name TEXT,
    slug TEXT,
    profile_image TEXT,
    profile_image_90 TEXT
)
"#,
};

pub const ARTICLE_HEADERS: Schema = Schema {
    table: "article_headers",
    fields: &[
        Field::text("type_of"),
        Field::integer("id"),
        Field::text("title"),
        Field::text("description"),
        Field::text("cover_image"),
        Field::text("readable_publish_date"),
        Field::text("social_image"),
        Field::text("tags"),
        Field::text("slug"),
        Field::text("path"),
        Field::text("url"),
        Field::text("canonical_url"),
        Field::integer("comments"),
        Field::integer("positive_reactions_count"),
        Field::integer("collection_id"),
        Field::integer("comments_count"),
        Field::timestamp("created_at"),
        Field::timestamp("edited_at"),
        Field::timestamp("crossposted_at"),
        Field::timestamp("published_at"),
        Field::timestamp("last_comment_at"),
        Field::timestamp("published_timestamp"),
        Field::text("username"),
        Field::text("org_name"),
    ],
    unique: Some("id"),
    // Foreign keys are advisory: SQLite leaves them unenforced unless
    // PRAGMA foreign_keys is switched on.
    create_sql: r#"
CREATE TABLE IF NOT EXISTS article_headers (
    type_of TEXT,
    id INTEGER UNIQUE,
    title TEXT,
    description TEXT,
    cover_image TEXT,
    readable_publish_date TEXT,
    social_image TEXT,
    tags TEXT,
    slug TEXT,
    path TEXT,
    url TEXT,
    canonical_url TEXT,
    comments INTEGER,
    positive_reactions_count INTEGER,
    collection_id INTEGER,
    comments_count INTEGER,
    created_at TIMESTAMP,
    edited_at TIMESTAMP,
    crossposted_at TIMESTAMP,
    published_at TIMESTAMP,
    last_comment_at TIMESTAMP,
    published_timestamp TIMESTAMP,
    username TEXT,
    org_name TEXT,
    CONSTRAINT fk_user_of_article
        FOREIGN KEY (username) REFERENCES users (username),
    CONSTRAINT fk_org_of_article
        FOREIGN KEY (org_name) REFERENCES organizations (name)
)
"#,
};

pub const ARTICLE_BODIES: Schema = Schema {
    table: "article_bodies",
    fields: &[
        Field::integer("id"),
        Field::text("body_html"),
        Field::text("body_markdown"),
    ],
    unique: Some("id"),
    create_sql: r#"
CREATE TABLE IF NOT EXISTS article_bodies (
    id INTEGER UNIQUE,
    body_html TEXT,
    body_markdown TEXT,
    CONSTRAINT fk_article_body_of_header
        FOREIGN KEY (id) REFERENCES article_headers (id)
)
"#,
};

/// Every kind the store manages, in creation order
pub const MANAGED: &[Schema] = &[USERS, ORGANIZATIONS, ARTICLE_HEADERS, ARTICLE_BODIES];
