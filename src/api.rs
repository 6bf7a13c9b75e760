//! Article API client
//!
//! [`ArticleSource`] is the seam between the scraper and the network. The
//! production implementation, [`DevToClient`], talks to the dev.to REST API
//! with a blocking reqwest client.

use hyper::ext::ReasonPhrase;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use tracing::debug;

use crate::{Error, Result};

/// Where listings and full articles come from
pub trait ArticleSource {
    /// One page of listings; an empty page marks the end
    fn fetch_page(&self, page: u32) -> Result<Vec<Json>>;

    /// Full article, including the rendered body
    fn fetch_article(&self, id: i64) -> Result<Json>;
}

impl<S: ArticleSource + ?Sized> ArticleSource for &S {
    fn fetch_page(&self, page: u32) -> Result<Vec<Json>> {
        (**self).fetch_page(page)
    }

    fn fetch_article(&self, id: i64) -> Result<Json> {
        (**self).fetch_article(id)
    }
}

/// Blocking client for `GET /articles` and `GET /articles/{id}`
#[derive(Debug, Clone)]
pub struct DevToClient {
    http: Client,
    base_url: String,
}

impl DevToClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://dev.to/api";

    /// Create a client rooted at `base_url` (e.g. `https://dev.to/api`)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn articles_url(&self) -> String {
        format!("{}/articles", self.base_url)
    }

    /// Decode a 200 response, or fail with its status and reason phrase
    fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Http {
                status: status.as_u16(),
                reason: reason_phrase(&response),
            });
        }
        let body = response.bytes()?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Reason phrase from the status line. hyper only records it when it differs
/// from the canonical one, so fall back to that.
fn reason_phrase(response: &Response) -> String {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .and_then(|reason| std::str::from_utf8(reason.as_bytes()).ok())
        .or_else(|| response.status().canonical_reason())
        .unwrap_or("Unknown")
        .to_string()
}

impl ArticleSource for DevToClient {
    fn fetch_page(&self, page: u32) -> Result<Vec<Json>> {
        debug!(page, "fetching listing page");
        let response = self
            .http
            .get(self.articles_url())
            .query(&[("page", page)])
            .send()?;
        Self::decode(response)
    }

    fn fetch_article(&self, id: i64) -> Result<Json> {
        debug!(id, "fetching article");
        let response = self
            .http
            .get(format!("{}/{}", self.articles_url(), id))
            .send()?;
        Self::decode(response)
    }
}
