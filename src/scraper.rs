//! Scraper driver
//!
//! Walks the listing pages from page 1 until an empty page comes back. For
//! each page it flattens the listings, fetches bodies only for articles that
//! have none stored yet, and writes the whole page to the store once every
//! request for that page has succeeded.

use std::time::Duration;

use tracing::{debug, info};

use crate::api::ArticleSource;
use crate::flatten::PageBatch;
use crate::record::Record;
use crate::storage::SqliteStore;
use crate::{ArticleBody, Result};

/// Pause between body requests unless configured otherwise
pub const DEFAULT_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Sleep after every article body request
    pub delay: Duration,
    /// Stop after this many pages even if more are available
    pub max_pages: Option<u32>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            max_pages: None,
        }
    }
}

/// What a run fetched and wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub pages: u32,
    pub listings: usize,
    pub bodies_fetched: usize,
    pub users: usize,
    pub organizations: usize,
    pub headers: usize,
    pub bodies: usize,
}

impl ScrapeSummary {
    /// Total rows written across all tables
    pub fn rows_written(&self) -> usize {
        self.users + self.organizations + self.headers + self.bodies
    }
}

/// Sequential scraper over an [`ArticleSource`]
pub struct Scraper<S> {
    source: S,
    options: ScrapeOptions,
}

impl<S: ArticleSource> Scraper<S> {
    pub fn new(source: S, options: ScrapeOptions) -> Self {
        Self { source, options }
    }

    /// Scrape every page into `store`
    pub fn run(&self, store: &SqliteStore) -> Result<ScrapeSummary> {
        self.run_with(store, |_, _| {})
    }

    /// Scrape every page, calling `on_page` after each page is written
    pub fn run_with<F>(&self, store: &SqliteStore, mut on_page: F) -> Result<ScrapeSummary>
    where
        F: FnMut(u32, &ScrapeSummary),
    {
        let mut summary = ScrapeSummary::default();
        let mut page = 1;

        loop {
            if self.options.max_pages.is_some_and(|max| summary.pages >= max) {
                info!(pages = summary.pages, "page limit reached");
                break;
            }
            if !self.scrape_page(store, page, &mut summary)? {
                info!(page, "empty page, scraping done");
                break;
            }
            on_page(page, &summary);
            page += 1;
        }

        Ok(summary)
    }

    /// Fetch and store one page. Returns false once the listing is empty.
    fn scrape_page(&self, store: &SqliteStore, page: u32, summary: &mut ScrapeSummary) -> Result<bool> {
        let listings = self.source.fetch_page(page)?;
        if listings.is_empty() {
            return Ok(false);
        }
        let listing_count = listings.len();

        let batch = PageBatch::from_listings(listings)?;
        let bodies = self.fetch_missing_bodies(store, page, &batch.article_ids)?;
        let bodies_fetched = bodies.len();

        summary.users += store.insert_many(batch.users)?;
        summary.organizations += store.insert_many(batch.organizations)?;
        summary.headers += store.insert_many(batch.headers)?;
        summary.bodies += store.insert_many(bodies)?;
        summary.pages += 1;
        summary.listings += listing_count;
        summary.bodies_fetched += bodies_fetched;

        info!(
            page,
            listings = listing_count,
            bodies = bodies_fetched,
            "stored page"
        );
        Ok(true)
    }

    fn fetch_missing_bodies(&self, store: &SqliteStore, page: u32, ids: &[i64]) -> Result<Vec<ArticleBody>> {
        let mut bodies = Vec::new();
        for &id in ids {
            if store.contains::<ArticleBody>(id)? {
                debug!(id, "body already stored");
                continue;
            }
            debug!(page, id, "fetching body");
            let article = self.source.fetch_article(id)?;
            bodies.push(ArticleBody::from_json(&article));
            if !self.options.delay.is_zero() {
                std::thread::sleep(self.options.delay);
            }
        }
        Ok(bodies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArticleHeader, Error, Organization, User};
    use serde_json::{Value as Json, json};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory API that records every request it serves
    #[derive(Default)]
    struct MockSource {
        pages: Vec<Vec<Json>>,
        failing_article: Option<i64>,
        page_requests: RefCell<Vec<u32>>,
        article_requests: RefCell<Vec<i64>>,
    }

    impl MockSource {
        fn with_pages(pages: Vec<Vec<Json>>) -> Self {
            Self { pages, ..Default::default() }
        }

        fn article_calls(&self) -> HashMap<i64, usize> {
            let mut calls = HashMap::new();
            for id in self.article_requests.borrow().iter() {
                *calls.entry(*id).or_default() += 1;
            }
            calls
        }
    }

    impl ArticleSource for MockSource {
        fn fetch_page(&self, page: u32) -> Result<Vec<Json>> {
            self.page_requests.borrow_mut().push(page);
            let index = page as usize - 1;
            Ok(self.pages.get(index).cloned().unwrap_or_default())
        }

        fn fetch_article(&self, id: i64) -> Result<Json> {
            self.article_requests.borrow_mut().push(id);
            if self.failing_article == Some(id) {
                return Err(Error::Http { status: 503, reason: "Service Unavailable".into() });
            }
            Ok(json!({
                "id": id,
                "title": format!("Article {}", id),
                "body_html": format!("<p>body {}</p>", id),
                "body_markdown": format!("body {}", id),
            }))
        }
    }

    fn listing(id: i64, username: &str, org: Option<&str>) -> Json {
        let mut user = json!({ "name": username.to_uppercase(), "username": username });
        if let Some(org) = org {
            user["organization"] = json!({ "name": org, "username": org.to_lowercase(), "slug": org.to_lowercase() });
        }
        json!({
            "type_of": "article",
            "id": id,
            "title": format!("Article {}", id),
            "tag_list": ["rust"],
            "published_at": "2024-03-01T10:20:30Z",
            "published_timestamp": "2024-03-01T10:20:30Z",
            "user": user,
        })
    }

    fn two_pages() -> Vec<Vec<Json>> {
        vec![
            vec![listing(1, "ben", Some("DEV")), listing(2, "jess", None)],
            vec![listing(3, "ben", None), listing(4, "anna", Some("Acme"))],
        ]
    }

    fn quick() -> ScrapeOptions {
        ScrapeOptions { delay: Duration::ZERO, max_pages: None }
    }

    fn table_counts(store: &SqliteStore) -> [usize; 4] {
        [
            store.count::<User>().unwrap(),
            store.count::<Organization>().unwrap(),
            store.count::<ArticleHeader>().unwrap(),
            store.count::<ArticleBody>().unwrap(),
        ]
    }

    #[test]
    fn test_run_stores_every_kind() {
        let store = SqliteStore::open_in_memory().unwrap();
        let source = MockSource::with_pages(two_pages());

        let summary = Scraper::new(&source, quick()).run(&store).unwrap();

        assert_eq!(summary.pages, 2);
        assert_eq!(summary.listings, 4);
        assert_eq!(summary.bodies_fetched, 4);
        assert_eq!(table_counts(&store), [3, 2, 4, 4]);
        assert_eq!(summary.rows_written(), 13);
    }

    #[test]
    fn test_empty_page_ends_run() {
        let store = SqliteStore::open_in_memory().unwrap();
        let source = MockSource::with_pages(two_pages());

        Scraper::new(&source, quick()).run(&store).unwrap();

        assert_eq!(*source.page_requests.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_first_page_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        let source = MockSource::default();

        let summary = Scraper::new(&source, quick()).run(&store).unwrap();

        assert_eq!(summary, ScrapeSummary::default());
        assert_eq!(*source.page_requests.borrow(), vec![1]);
        assert!(source.article_requests.borrow().is_empty());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let source = MockSource::with_pages(two_pages());
        let scraper = Scraper::new(&source, quick());

        scraper.run(&store).unwrap();
        let after_first = table_counts(&store);
        let second = scraper.run(&store).unwrap();

        assert_eq!(table_counts(&store), after_first);
        assert_eq!(second.rows_written(), 0);
        assert_eq!(second.bodies_fetched, 0);
    }

    #[test]
    fn test_stored_bodies_are_not_refetched() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert(ArticleBody::new(2, "<p>old</p>", "old")).unwrap();
        let source = MockSource::with_pages(two_pages());

        Scraper::new(&source, quick()).run(&store).unwrap();

        let calls = source.article_calls();
        assert_eq!(calls.get(&2), None);
        assert_eq!(calls.get(&1), Some(&1));
        assert_eq!(calls.len(), 3);
    }

    #[test]
    fn test_failed_body_fetch_writes_nothing_for_page() {
        let store = SqliteStore::open_in_memory().unwrap();
        let source = MockSource {
            failing_article: Some(4),
            ..MockSource::with_pages(two_pages())
        };

        let err = Scraper::new(&source, quick()).run(&store).unwrap_err();

        assert!(matches!(err, Error::Http { status: 503, ref reason } if reason == "Service Unavailable"));
        // Page 1 landed, page 2 did not
        assert_eq!(table_counts(&store), [2, 1, 2, 2]);
        assert!(!store.contains::<ArticleHeader>(3_i64).unwrap());
        assert_eq!(*source.page_requests.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_max_pages_caps_run() {
        let store = SqliteStore::open_in_memory().unwrap();
        let source = MockSource::with_pages(two_pages());
        let options = ScrapeOptions { max_pages: Some(1), ..quick() };

        let mut seen = Vec::new();
        let summary = Scraper::new(&source, options)
            .run_with(&store, |page, _| seen.push(page))
            .unwrap();

        assert_eq!(summary.pages, 1);
        assert_eq!(seen, vec![1]);
        assert_eq!(*source.page_requests.borrow(), vec![1]);
    }

    #[test]
    fn test_first_stored_version_wins() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = MockSource::with_pages(vec![vec![listing(1, "ben", None)]]);
        Scraper::new(&first, quick()).run(&store).unwrap();

        let mut renamed = listing(1, "ben", None);
        renamed["title"] = json!("Renamed");
        let second = MockSource::with_pages(vec![vec![renamed]]);
        Scraper::new(&second, quick()).run(&store).unwrap();

        let title: String = store
            .connection()
            .query_row("SELECT title FROM article_headers WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(title, "Article 1");
    }

    #[test]
    fn test_unparseable_date_does_not_stall_run() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut broken = listing(2, "jess", None);
        broken["edited_at"] = json!("");
        let source = MockSource::with_pages(vec![vec![listing(1, "ben", None), broken]]);
        let scraper = Scraper::new(&source, quick());

        let first = scraper.run(&store).unwrap();
        assert_eq!(first.pages, 1);
        assert_eq!(table_counts(&store), [2, 0, 2, 2]);

        let second = scraper.run(&store).unwrap();
        assert_eq!(second.rows_written(), 0);
        assert_eq!(second.bodies_fetched, 0);
        assert_eq!(source.article_calls().values().sum::<usize>(), 2);

        let edited: String = store
            .connection()
            .query_row("SELECT edited_at FROM article_headers WHERE id = 2", [], |row| row.get(0))
            .unwrap();
        assert_eq!(edited, "");
    }

    #[test]
    fn test_listing_without_id_is_not_stored() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut anonymous = listing(0, "anna", None);
        anonymous.as_object_mut().unwrap().remove("id");
        let source = MockSource::with_pages(vec![vec![listing(1, "ben", None), anonymous]]);
        let scraper = Scraper::new(&source, quick());

        scraper.run(&store).unwrap();
        scraper.run(&store).unwrap();

        // The author is still kept; the header is not
        assert_eq!(table_counts(&store), [2, 0, 1, 1]);
        assert_eq!(*source.article_requests.borrow(), vec![1]);
    }
}
