//! Listing flattening
//!
//! A listing from the articles index nests its author and organization. These
//! are split out into their own records and replaced on the header by
//! natural-key references (`username`, `org_name`).

use std::collections::HashMap;

use serde_json::Value as Json;
use tracing::warn;

use crate::record::Record;
use crate::{ArticleHeader, Error, Organization, Result, User};

/// Records produced from a single listing
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    pub header: ArticleHeader,
    pub user: Option<User>,
    pub organization: Option<Organization>,
}

/// Split one listing into header, user and organization records.
///
/// The organization is read from the listing itself or, failing that, from
/// the user object. A user without a username yields no user record.
pub fn flatten_listing(mut listing: Json) -> Result<Flattened> {
    let Some(fields) = listing.as_object_mut() else {
        return Err(Error::Shape(format!("listing is not an object: {}", listing)));
    };

    fields.remove("tag_list");
    let mut user = fields.remove("user").filter(Json::is_object);
    let organization = fields
        .remove("organization")
        .filter(Json::is_object)
        .or_else(|| {
            user.as_mut()
                .and_then(Json::as_object_mut)
                .and_then(|u| u.remove("organization"))
                .filter(Json::is_object)
        });

    let username = user
        .as_ref()
        .and_then(|u| u.get("username"))
        .filter(|name| !name.is_null())
        .cloned();
    let org_name = organization
        .as_ref()
        .and_then(|o| o.get("name"))
        .cloned();

    fields.insert("username".to_string(), username.clone().unwrap_or(Json::Null));
    fields.insert("org_name".to_string(), org_name.unwrap_or(Json::Null));

    Ok(Flattened {
        header: ArticleHeader::from_json(&listing),
        user: username.and(user.as_ref()).map(User::from_json),
        organization: organization.as_ref().map(Organization::from_json),
    })
}

/// Everything one listing page contributes to the store
#[derive(Debug, Default)]
pub struct PageBatch {
    /// Article ids in page order
    pub article_ids: Vec<i64>,
    pub headers: Vec<ArticleHeader>,
    pub users: Vec<User>,
    pub organizations: Vec<Organization>,
}

impl PageBatch {
    /// Flatten a page of listings.
    ///
    /// Users and organizations are deduplicated by username: the last one
    /// seen wins but keeps the position of the first.
    pub fn from_listings(listings: Vec<Json>) -> Result<Self> {
        let mut batch = PageBatch::default();
        let mut users = KeyedRecords::default();
        let mut organizations = KeyedRecords::default();

        for listing in listings {
            let flattened = flatten_listing(listing)?;

            match flattened.header.id() {
                Some(id) => {
                    batch.article_ids.push(id);
                    batch.headers.push(flattened.header);
                }
                None => warn!(title = ?flattened.header.title(), "skipping listing without an id"),
            }

            if let Some(user) = flattened.user {
                users.put(user.username().map(str::to_string), user);
            }
            if let Some(org) = flattened.organization {
                organizations.put(org.username().map(str::to_string), org);
            }
        }

        batch.users = users.into_records();
        batch.organizations = organizations.into_records();
        Ok(batch)
    }
}

/// Insertion-ordered records where a repeated key replaces the earlier record
#[derive(Debug)]
struct KeyedRecords<R> {
    positions: HashMap<String, usize>,
    records: Vec<R>,
}

impl<R> Default for KeyedRecords<R> {
    fn default() -> Self {
        Self {
            positions: HashMap::new(),
            records: Vec::new(),
        }
    }
}

impl<R> KeyedRecords<R> {
    fn put(&mut self, key: Option<String>, record: R) {
        let Some(key) = key else {
            self.records.push(record);
            return;
        };
        match self.positions.get(&key) {
            Some(&i) => self.records[i] = record,
            None => {
                self.positions.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    fn into_records(self) -> Vec<R> {
        self.records
    }
}
