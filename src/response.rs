//! Raw HTTP responses as returned by the executor.
//!
//! The executor does not interpret status codes; callers inspect the status,
//! read headers (case-insensitively, duplicates preserved) and decode the body.

use bytes::Bytes;
use http::header::ETAG;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::RtError;

/// Status, headers and body of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Creates a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the first value of header `name`, if it is valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns every value of header `name` in the order received.
    pub fn header_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .get_all(name)
            .into_iter()
            .filter_map(|v| v.to_str().ok())
    }

    /// Returns the body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consumes the response and returns the body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Returns the concurrency token from the `ETag` header, ready to send
    /// back in `If-Match`.
    ///
    /// A pair of surrounding quotes is removed. Any other value, such as a
    /// weak `W/"..."` tag, is returned as received.
    pub fn etag(&self) -> Option<&str> {
        self.headers
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|etag| {
                let etag = etag.trim();
                etag.strip_prefix('"')
                    .and_then(|inner| inner.strip_suffix('"'))
                    .unwrap_or(etag)
            })
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `RtError::Serialization` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RtError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}
