//! Article records: listing headers and lazily fetched bodies

use chrono::{DateTime, Utc};

use crate::record::{Record, impl_record};
use crate::storage::Value;
use crate::storage::schema::{ARTICLE_BODIES, ARTICLE_HEADERS};

/// Listing metadata for one article.
///
/// `username` and `org_name` refer to [`crate::User`] and
/// [`crate::Organization`] by natural key.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleHeader {
    values: Vec<Value>,
}

impl_record!(ArticleHeader, ARTICLE_HEADERS);

impl ArticleHeader {
    pub fn id(&self) -> Option<i64> {
        self.integer("id")
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }

    pub fn username(&self) -> Option<&str> {
        self.text("username")
    }

    pub fn org_name(&self) -> Option<&str> {
        self.text("org_name")
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("published_at")
    }
}

/// Rendered body of an article; shares its id with the header
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleBody {
    values: Vec<Value>,
}

impl_record!(ArticleBody, ARTICLE_BODIES);

impl ArticleBody {
    pub fn new(id: i64, body_html: impl Into<String>, body_markdown: impl Into<String>) -> Self {
        Self::from_values(vec![
            Value::Integer(id),
            Value::Text(body_html.into()),
            Value::Text(body_markdown.into()),
        ])
    }

    pub fn id(&self) -> Option<i64> {
        self.integer("id")
    }

    pub fn body_html(&self) -> Option<&str> {
        self.text("body_html")
    }

    pub fn body_markdown(&self) -> Option<&str> {
        self.text("body_markdown")
    }
}
