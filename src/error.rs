//! Error types for the RT client core.
//!
//! This module defines `RtError`, the unified error type returned by every
//! stage of request execution and pagination. Each variant names the stage
//! that failed so callers can tell a rejected credential from a dropped
//! connection from a malformed page without inspecting messages.
//!
//! # Security
//!
//! Error messages never carry credentials. Use `sanitize_message()` when
//! building a message from text that came back from the server or transport.

use http::{Method, StatusCode};
use thiserror::Error;
use url::Url;

/// Boxed transport failure kept as the source of [`RtError::NetworkRequestFailed`].
pub type TransportFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for all RT client operations.
#[derive(Error, Debug)]
pub enum RtError {
    /// Configuration error - missing or invalid environment variables or settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Basic authentication credentials are not in `user:password` form.
    #[error("basic credentials must be in the user:password format")]
    InvalidCredentialFormat,

    /// A PUT request was built without an ETag to send in `If-Match`.
    #[error("update requests require a concurrency token (ETag)")]
    MissingConcurrencyToken,

    /// A request body was supplied with an empty content type.
    #[error("request body has no content type")]
    MissingContentType,

    /// A header value contains bytes that cannot be sent over HTTP.
    #[error("invalid value for header {name}")]
    InvalidHeaderValue {
        /// The header that could not be set.
        name: &'static str,
    },

    /// The request target does not form a valid absolute URL.
    #[error("invalid request target {target}: {reason}")]
    InvalidTarget {
        /// The target as supplied.
        target: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A fully-qualified URL points at a host other than the configured RT host.
    #[error("refusing to send credentials to {actual}, expected host {expected}")]
    HostMismatch {
        /// The configured RT host.
        expected: String,
        /// The host found in the URL.
        actual: String,
    },

    /// The transport failed to send the request or receive the response.
    #[error("network request failed: {method} {url}")]
    NetworkRequestFailed {
        /// HTTP method of the failed request.
        method: Method,
        /// Target URL of the failed request.
        url: String,
        /// The transport-level cause.
        #[source]
        source: TransportFailure,
    },

    /// The server answered with a status the caller did not expect.
    #[error("HTTP {status}: {body}")]
    UnexpectedStatus {
        /// The HTTP status code returned.
        status: StatusCode,
        /// The response body, sanitized and truncated.
        body: String,
    },

    /// The page handed to the walker is not the first page of a collection.
    #[error("invalid first page: {reason}")]
    InvalidFirstPage {
        /// What was wrong with the page.
        reason: String,
    },

    /// A follow-up page request returned a non-200 status.
    #[error("failed to fetch paginated data from {url}: HTTP {status}")]
    FailedToFetchPaginatedData {
        /// The page URL that was requested.
        url: String,
        /// The status the server returned.
        status: StatusCode,
    },

    /// A follow-up page body could not be decoded as a page.
    #[error("failed to decode page {url}: {reason}")]
    FailedToDecodePage {
        /// The page URL that was requested.
        url: String,
        /// What was wrong with the body.
        reason: String,
    },

    /// The walk reached the configured maximum number of pages.
    #[error("pagination stopped after {limit} pages - the server keeps reporting a next page")]
    PaginationLimitExceeded {
        /// The configured page limit.
        limit: usize,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RtError {
    /// Creates a configuration error for a missing environment variable.
    pub fn missing_env(var_name: &str) -> Self {
        RtError::Config(format!(
            "missing required environment variable: {}",
            var_name
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        RtError::Config(message.into())
    }

    /// Creates an invalid target error.
    pub fn invalid_target(target: impl Into<String>, reason: impl ToString) -> Self {
        RtError::InvalidTarget {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Wraps a transport failure for the given request.
    pub fn network(method: Method, url: &Url, source: impl Into<TransportFailure>) -> Self {
        RtError::NetworkRequestFailed {
            method,
            url: url.to_string(),
            source: source.into(),
        }
    }

    /// Creates an invalid first page error.
    pub fn invalid_first_page(reason: impl Into<String>) -> Self {
        RtError::InvalidFirstPage {
            reason: reason.into(),
        }
    }

    /// Creates a page decoding error for the given page URL.
    pub fn page_decode(url: &Url, reason: impl Into<String>) -> Self {
        RtError::FailedToDecodePage {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error came from the pagination walker.
    #[must_use]
    pub fn is_pagination_error(&self) -> bool {
        matches!(
            self,
            RtError::InvalidFirstPage { .. }
                | RtError::FailedToFetchPaginatedData { .. }
                | RtError::FailedToDecodePage { .. }
                | RtError::PaginationLimitExceeded { .. }
        )
    }

    /// Sanitizes a message by replacing every occurrence of the credential
    /// with `[REDACTED]`.
    #[must_use]
    pub fn sanitize_message(message: &str, credentials: &str) -> String {
        if credentials.is_empty() {
            return message.to_string();
        }
        message.replace(credentials, "[REDACTED]")
    }

    /// Creates a sanitized version of this error's display message.
    #[must_use]
    pub fn sanitized_display(&self, credentials: &str) -> String {
        Self::sanitize_message(&self.to_string(), credentials)
    }
}
