//! RT session handle.
//!
//! `RtClient` ties one [`Config`] to one transport handle and composes the
//! core for callers: it fills in host and credentials, builds and executes
//! requests, and walks collection endpoints. Requests are issued strictly one
//! at a time, including while following pages.
//!
//! # Security
//!
//! Credentials are never logged. Fully-qualified URLs (hyperlinks and page
//! links returned by the server) are only followed when they point at the
//! configured host, so credentials are not sent elsewhere.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::auth;
use crate::config::Config;
use crate::error::RtError;
use crate::executor;
use crate::pagination::{self, Page, PageFetcher};
use crate::request::{RequestBody, RequestDescription, RequestMethod, Target};
use crate::response::Response;
use crate::transport::{ReqwestTransport, Transport};

/// Maximum length for HTTP error response bodies kept in errors.
const MAX_ERROR_BODY_LEN: usize = 500;

/// Client for the RT REST 2.0 API.
///
/// # Example
///
/// ```ignore
/// let config = Config::from_env()?;
/// let client = RtClient::open(config)?;
///
/// let queues = client.fetch_collection("/queues/all", &[("fields", "Name")]).await?;
/// for queue in &queues {
///     println!("{}", queue["Name"]);
/// }
///
/// client.close();
/// ```
#[derive(Debug, Clone)]
pub struct RtClient<T = ReqwestTransport> {
    config: Config,
    transport: T,
}

impl RtClient<ReqwestTransport> {
    /// Opens a client with a new reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns `RtError::HttpClient` if the HTTP client fails to initialize.
    pub fn open(config: Config) -> Result<Self, RtError> {
        let transport = ReqwestTransport::open(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> RtClient<T> {
    /// Creates a client over an existing transport.
    pub fn with_transport(config: Config, transport: T) -> Self {
        tracing::debug!(
            host = %config.host,
            auth_mode = %config.auth_mode,
            "RT client initialized"
        );
        Self { config, transport }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the transport handle.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Ends the session and hands back the transport.
    pub fn close(self) -> T {
        tracing::debug!(host = %self.config.host, "RT client closed");
        self.transport
    }

    /// Returns the target for `path` under the API root of the configured host.
    pub fn target(&self, path: &str) -> Target {
        Target::api(self.config.host.clone(), path)
    }

    /// Describes an authenticated request for `path` under the API root.
    pub fn describe(&self, method: RequestMethod, path: &str) -> RequestDescription {
        self.authenticate(RequestDescription::new(method, self.target(path)))
    }

    /// Describes an authenticated request for a fully-qualified URL.
    pub fn describe_url(&self, method: RequestMethod, url: Url) -> RequestDescription {
        self.authenticate(RequestDescription::new(method, Target::Url(url)))
    }

    fn authenticate(&self, description: RequestDescription) -> RequestDescription {
        description.with_auth(self.config.auth_mode, self.config.credentials())
    }

    /// Builds and executes `description`, returning the raw response.
    ///
    /// # Errors
    ///
    /// - `RtError::HostMismatch` if a URL target points at another host
    /// - any error from building the request
    /// - `RtError::NetworkRequestFailed` if the transport fails
    pub async fn execute(&self, description: &RequestDescription) -> Result<Response, RtError> {
        self.check_host(description.target())?;
        let request = description.build(&self.config)?;
        executor::execute(&self.transport, request, self.config.timeout).await
    }

    /// Sends an authenticated GET for `path` with `query` parameters.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response, RtError> {
        let description = self
            .describe(RequestMethod::Get, path)
            .with_query_pairs(query.iter().copied());
        self.execute(&description).await
    }

    /// Sends an authenticated GET for a fully-qualified URL.
    pub async fn get_url(&self, url: Url) -> Result<Response, RtError> {
        let description = self.describe_url(RequestMethod::Get, url);
        self.execute(&description).await
    }

    /// Creates a resource by POSTing `value` as JSON to `target`.
    pub async fn post_json<B>(&self, target: Target, value: &B) -> Result<Response, RtError>
    where
        B: Serialize + ?Sized,
    {
        let body = RequestBody::json(value)?;
        let description = self.authenticate(RequestDescription::post(target, body));
        self.execute(&description).await
    }

    /// Updates a resource by PUTting `value` as JSON to `target`, guarded by `etag`.
    ///
    /// The ETag is usually read from a prior GET with [`Response::etag`].
    pub async fn put_json<B>(
        &self,
        target: Target,
        value: &B,
        etag: &str,
    ) -> Result<Response, RtError>
    where
        B: Serialize + ?Sized,
    {
        let body = RequestBody::json(value)?;
        let description = self.authenticate(RequestDescription::put(target, body, etag));
        self.execute(&description).await
    }

    /// Fetches every item of the collection at `path`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let users = client
    ///     .fetch_collection("/users", &[("fields", "RealName,Name")])
    ///     .await?;
    /// ```
    ///
    /// # Errors
    ///
    /// - `RtError::UnexpectedStatus` if the first page is not HTTP 200
    /// - any error from [`RtClient::collect`]
    pub async fn fetch_collection(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<Value>, RtError> {
        let response = self.get(path, query).await?;
        self.collect(response).await
    }

    /// Runs an RT search on the `resource` collection (`ticket`, `user`,
    /// `queue`, ...) and returns every matching record.
    ///
    /// `fields` selects the fields included in each record.
    pub async fn search(
        &self,
        resource: &str,
        query: &str,
        fields: &[&str],
    ) -> Result<Vec<Value>, RtError> {
        let path = format!("/{}s", resource.trim_matches('/'));
        let fields = fields.join(",");
        let mut params = vec![("query", query)];
        if !fields.is_empty() {
            params.push(("fields", fields.as_str()));
        }
        self.fetch_collection(&path, &params).await
    }

    /// Runs a TicketSQL search and returns every matching ticket record.
    pub async fn search_tickets(
        &self,
        query: &str,
        fields: &[&str],
    ) -> Result<Vec<Value>, RtError> {
        self.search("ticket", query, fields).await
    }

    /// Decodes `first_page` and aggregates the rest of its collection.
    ///
    /// # Errors
    ///
    /// - `RtError::UnexpectedStatus` if `first_page` is not HTTP 200
    /// - `RtError::InvalidFirstPage` if its body is not a JSON object or
    ///   not a valid first page
    /// - any error from [`pagination::aggregate`]
    pub async fn collect(&self, first_page: Response) -> Result<Vec<Value>, RtError> {
        if first_page.status() != http::StatusCode::OK {
            return Err(self.unexpected_status(&first_page));
        }

        let page = Page::parse(first_page.body()).map_err(RtError::invalid_first_page)?;
        let items = pagination::aggregate(page, self, self.config.max_pages).await?;

        tracing::debug!(items = items.len(), "Collection aggregated");
        Ok(items)
    }

    /// Converts a response with an unexpected status into an error,
    /// sanitizing and truncating the body.
    fn unexpected_status(&self, response: &Response) -> RtError {
        let body = auth::secret_forms(self.config.auth_mode, self.config.credentials())
            .iter()
            .fold(response.text(), |text, secret| {
                RtError::sanitize_message(&text, secret)
            });
        let body = if body.len() > MAX_ERROR_BODY_LEN {
            let mut end = MAX_ERROR_BODY_LEN;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...[truncated]", &body[..end])
        } else {
            body
        };

        RtError::UnexpectedStatus {
            status: response.status(),
            body,
        }
    }

    /// Rejects URL targets that do not point at the configured host.
    fn check_host(&self, target: &Target) -> Result<(), RtError> {
        let Target::Url(url) = target else {
            return Ok(());
        };

        let base_raw = format!("{}://{}", self.config.scheme, self.config.host);
        let base =
            Url::parse(&base_raw).map_err(|e| RtError::invalid_target(base_raw.clone(), e))?;

        if url.host_str() != base.host_str()
            || url.port_or_known_default() != base.port_or_known_default()
        {
            let host = url.host_str().unwrap_or_default();
            let actual = match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };
            tracing::warn!(expected = %self.config.host, actual = %actual, "Refusing foreign URL");
            return Err(RtError::HostMismatch {
                expected: self.config.host.clone(),
                actual,
            });
        }

        Ok(())
    }
}

impl<T: Transport> PageFetcher for RtClient<T> {
    async fn fetch_page(&self, url: Url) -> Result<Response, RtError> {
        self.get_url(url).await
    }
}
