//! Pagination over RT collection endpoints.
//!
//! RT answers collection requests one page at a time:
//!
//! ```json
//! {
//!   "page": 1, "pages": 3, "per_page": 20, "count": 20, "total": 47,
//!   "next_page": "https://rt.example.com/REST/2.0/tickets?page=2&per_page=20",
//!   "items": [ ... ]
//! }
//! ```
//!
//! [`aggregate`] starts from the first page and follows `next_page` links one
//! request at a time, concatenating each page's `items` in order. Records
//! are kept as opaque JSON values; decoding them into domain types is up to
//! the caller. Any failure part way through discards everything collected
//! so far.

use std::future::Future;

use http::StatusCode;
use serde_json::{Map, Value};
use url::Url;

use crate::error::RtError;
use crate::response::Response;

/// Keys every page fetched while walking must carry.
pub const PAGINATION_KEYS: [&str; 6] = ["page", "total", "pages", "count", "per_page", "items"];

/// A decoded page of a collection response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    fields: Map<String, Value>,
}

impl Page {
    /// Wraps a decoded JSON value, or returns `None` if it is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Decodes a page from a response body.
    pub(crate) fn parse(body: &[u8]) -> Result<Self, String> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| format!("body is not valid JSON: {}", e))?;
        Self::from_value(value).ok_or_else(|| "body is not a JSON object".to_string())
    }

    /// Returns the raw value of `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the pagination keys this page lacks. Present-but-null counts as present.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        PAGINATION_KEYS
            .iter()
            .copied()
            .filter(|key| !self.fields.contains_key(*key))
            .collect()
    }

    /// Returns true if every pagination key is present.
    pub fn has_pagination_keys(&self) -> bool {
        self.missing_keys().is_empty()
    }

    /// Returns the page number.
    pub fn page(&self) -> Option<u64> {
        self.number("page")
    }

    /// Returns the number of pages.
    pub fn pages(&self) -> Option<u64> {
        self.number("pages")
    }

    /// Returns the total number of records across all pages.
    pub fn total(&self) -> Option<u64> {
        self.number("total")
    }

    /// Returns the item records, if `items` is an array.
    pub fn items(&self) -> Option<&[Value]> {
        self.fields
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Returns the `next_page` link. A null link counts as absent.
    pub fn next_page(&self) -> Option<&Value> {
        self.link("next_page")
    }

    /// Returns the `prev_page` link. A null link counts as absent.
    pub fn prev_page(&self) -> Option<&Value> {
        self.link("prev_page")
    }

    fn link(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    fn number(&self, key: &str) -> Option<u64> {
        self.fields.get(key).and_then(Value::as_u64)
    }

    fn into_items(mut self) -> Option<Vec<Value>> {
        match self.fields.remove("items") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        }
    }
}

/// Fetches a page by URL with the same authentication as the original call.
pub trait PageFetcher {
    /// Issues a `GET` for `url` and returns the raw response.
    fn fetch_page(&self, url: Url) -> impl Future<Output = Result<Response, RtError>> + Send;
}

/// Collects every item of a paginated collection, starting from `first_page`.
///
/// A page without `next_page` and `prev_page` is complete on its own and is
/// returned without any request. Otherwise each `next_page` is fetched in
/// turn until a page has no `next_page`. `max_pages`, when set, bounds the
/// number of pages including the first.
///
/// # Errors
///
/// - `RtError::InvalidFirstPage` if `first_page` has a `prev_page`, lacks an
///   `items` array, or has a `next_page` that is not an absolute URL
/// - `RtError::FailedToFetchPaginatedData` if a follow-up page is not HTTP 200
/// - `RtError::FailedToDecodePage` if a follow-up page is not a JSON object
///   with every pagination key, or its `next_page` is not an absolute URL
/// - `RtError::PaginationLimitExceeded` if more than `max_pages` pages exist
/// - any error returned by `fetcher`
pub async fn aggregate<F: PageFetcher>(
    first_page: Page,
    fetcher: &F,
    max_pages: Option<usize>,
) -> Result<Vec<Value>, RtError> {
    if first_page.prev_page().is_some() {
        return Err(RtError::invalid_first_page(
            "prev_page is present, aggregation must start from the first page",
        ));
    }

    let next_url = match first_page.next_page() {
        Some(link) => Some(parse_link(link).map_err(|reason| {
            RtError::invalid_first_page(format!("next_page {}", reason))
        })?),
        None => None,
    };

    let mut items = first_page
        .into_items()
        .ok_or_else(|| RtError::invalid_first_page("items is missing or not an array"))?;

    let mut cursor = match next_url {
        Some(url) => url,
        None => return Ok(items),
    };

    let mut pages_merged = 1usize;
    loop {
        if let Some(limit) = max_pages {
            if pages_merged >= limit {
                tracing::warn!(limit, next_page = %cursor, "Pagination limit reached");
                return Err(RtError::PaginationLimitExceeded { limit });
            }
        }

        let response = fetcher.fetch_page(cursor.clone()).await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(url = %cursor, status = %status, "Failed to fetch page");
            return Err(RtError::FailedToFetchPaginatedData {
                url: cursor.to_string(),
                status,
            });
        }

        let page =
            Page::parse(response.body()).map_err(|reason| RtError::page_decode(&cursor, reason))?;

        let missing = page.missing_keys();
        if !missing.is_empty() {
            return Err(RtError::page_decode(
                &cursor,
                format!("missing pagination keys: {}", missing.join(", ")),
            ));
        }

        let next_url = match page.next_page() {
            Some(link) => Some(parse_link(link).map_err(|reason| {
                RtError::page_decode(&cursor, format!("next_page {}", reason))
            })?),
            None => None,
        };

        let page_items = page
            .into_items()
            .ok_or_else(|| RtError::page_decode(&cursor, "items is not an array"))?;

        pages_merged += 1;
        tracing::debug!(
            page = pages_merged,
            items = page_items.len(),
            collected = items.len() + page_items.len(),
            "Merged page"
        );
        items.extend(page_items);

        match next_url {
            Some(url) => cursor = url,
            None => return Ok(items),
        }
    }
}

/// Parses a page link into an absolute http(s) URL.
fn parse_link(link: &Value) -> Result<Url, String> {
    let raw = link.as_str().ok_or_else(|| "is not a string".to_string())?;
    let url = Url::parse(raw).map_err(|e| format!("is not a valid URL: {}", e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("has unsupported scheme {:?}", other)),
    }
}
