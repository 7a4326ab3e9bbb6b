//! # rt-client
//!
//! Client core for the Request Tracker (RT) REST 2.0 API.
//!
//! It turns a description of an RT call into a concrete HTTP request, sends
//! it through a pluggable transport, and walks RT's paginated collections.
//!
//! ## Features
//!
//! - **Authentication**: HTTP Basic (`user:password`), RT auth tokens, or none
//! - **Optimistic concurrency**: updates always carry an `If-Match` ETag
//! - **Pagination**: every page of a collection is fetched and concatenated,
//!   with a configurable page limit
//! - **Security**: credentials are never logged, and hyperlinks are only
//!   followed on the configured host
//!
//! ## Architecture
//!
//! - [`config`] - Connection settings, loaded from environment variables or built in code
//! - [`error`] - Error types with credential sanitization
//! - [`auth`] - Authentication modes and `Authorization` header values
//! - [`guard`] - Preconditions checked before a request is built
//! - [`request`] - Request descriptions and the pure request builder
//! - [`transport`] - The [`Transport`](transport::Transport) trait and its reqwest implementation
//! - [`executor`] - Sends a built request and returns the raw response
//! - [`response`] - Raw responses: status, headers, body, ETag
//! - [`pagination`] - Aggregation of paginated collections
//! - [`client`] - [`RtClient`](client::RtClient), the session handle tying it together
//!
//! ## Configuration
//!
//! [`Config::from_env`](config::Config::from_env) reads:
//!
//! - `RT_HOST`: RT host, optionally with a port (required)
//! - `RT_AUTH_MODE`: `basic`, `token` or `none` (default `token`)
//! - `RT_CREDENTIALS`: `user:password` or the auth token (required unless `none`)
//! - `RT_SCHEME`: `https` or `http` (default `https`)
//! - `RT_TIMEOUT_SECS`: request timeout in seconds (default 30)
//! - `RT_MAX_PAGES`: page limit for collections, `0` for none (default 1000)
//!
//! ## Example
//!
//! ```ignore
//! use rt_client::client::RtClient;
//! use rt_client::config::Config;
//!
//! async fn example() -> Result<(), rt_client::error::RtError> {
//!     let client = RtClient::open(Config::from_env()?)?;
//!
//!     // Read a ticket and update it under its ETag
//!     let ticket = client.get("/ticket/42", &[]).await?;
//!     let etag = ticket.etag().unwrap_or_default().to_string();
//!     let update = serde_json::json!({ "Status": "resolved" });
//!     client.put_json(client.target("/ticket/42"), &update, &etag).await?;
//!
//!     // Every open ticket in the General queue
//!     let tickets = client
//!         .search_tickets("Queue = 'General' AND Status = '__Active__'", &["Subject"])
//!         .await?;
//!     println!("{} open tickets", tickets.len());
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod guard;
pub mod pagination;
pub mod request;
pub mod response;
pub mod transport;

pub use auth::AuthMode;
pub use client::RtClient;
pub use config::{Config, Scheme};
pub use error::RtError;
pub use pagination::{Page, PageFetcher};
pub use request::{FinalizedRequest, RequestBody, RequestDescription, RequestMethod, Target};
pub use response::Response;
pub use transport::{ReqwestTransport, Transport};
