//! Transport abstraction.
//!
//! The core never owns a network connection. A [`Transport`] performs one
//! HTTP exchange for a [`FinalizedRequest`]; the caller decides how it pools
//! connections and whether it is shared between tasks. [`ReqwestTransport`]
//! is the default implementation.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::error::RtError;
use crate::request::FinalizedRequest;
use crate::response::Response;

/// Performs a single HTTP exchange.
pub trait Transport: Send + Sync {
    /// Transport-level failure (connection, TLS, DNS, timeout, ...).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends `request` and returns the full response, or fails if no response
    /// arrives within `timeout`.
    ///
    /// Non-success status codes are responses, not errors.
    fn send(
        &self,
        request: FinalizedRequest,
        timeout: Duration,
    ) -> impl Future<Output = Result<Response, Self::Error>> + Send;
}

/// Transport backed by a pooled `reqwest::Client`.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Opens a transport for `config`.
    ///
    /// # Errors
    ///
    /// Returns `RtError::HttpClient` if the HTTP client fails to initialize.
    pub fn open(config: &Config) -> Result<Self, RtError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RtError::HttpClient)?;

        tracing::debug!(host = %config.host, scheme = %config.scheme, "HTTP transport opened");

        Ok(Self { http })
    }

    /// Wraps an existing client, sharing its connection pool.
    pub fn from_client(http: Client) -> Self {
        Self { http }
    }

    /// Closes the transport, dropping its connection pool once no clones remain.
    pub fn close(self) {
        tracing::debug!("HTTP transport closed");
    }
}

impl Transport for ReqwestTransport {
    type Error = reqwest::Error;

    async fn send(
        &self,
        request: FinalizedRequest,
        timeout: Duration,
    ) -> Result<Response, Self::Error> {
        let (method, url, headers, body) = request.into_parts();

        let mut req = self
            .http
            .request(method, url)
            .headers(headers)
            .timeout(timeout);
        if let Some(body) = body {
            req = req.body(body);
        }

        let response = req.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(Response::new(status, headers, body))
    }
}
