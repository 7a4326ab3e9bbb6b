//! Request descriptions and the request builder.
//!
//! A [`RequestDescription`] says what one API call should do: where it goes,
//! which method it uses, how it authenticates, and what it carries. Building
//! it against a [`Config`] yields a [`FinalizedRequest`] with an absolute URL
//! and every header set, ready to hand to a transport. Building is a pure
//! transformation and can be repeated with identical results.

use std::fmt;

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE, IF_MATCH, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method};
use serde::Serialize;
use url::Url;

use crate::auth::{self, AuthMode};
use crate::config::{Config, Scheme};
use crate::error::RtError;
use crate::guard;

/// Content type used for JSON request bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP methods used by the RT API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    /// Fetch a resource.
    Get,
    /// Create a resource.
    Post,
    /// Update a resource; requires a concurrency token.
    Put,
}

impl RequestMethod {
    /// Returns the corresponding `http::Method`.
    pub fn as_method(&self) -> Method {
        match self {
            RequestMethod::Get => Method::GET,
            RequestMethod::Post => Method::POST,
            RequestMethod::Put => Method::PUT,
        }
    }

    /// Returns true for methods that send a body.
    pub fn has_body(&self) -> bool {
        matches!(self, RequestMethod::Post | RequestMethod::Put)
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method().as_str())
    }
}

/// Where a request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A path under the API root of `host`, e.g. `/ticket/12`.
    Api {
        /// Host, optionally with a port.
        host: String,
        /// Path below the API root.
        path: String,
    },
    /// A fully-qualified URL, typically a hyperlink returned by the server.
    Url(Url),
}

impl Target {
    /// Creates a target for `path` under the API root of `host`.
    pub fn api(host: impl Into<String>, path: impl Into<String>) -> Self {
        Target::Api {
            host: host.into(),
            path: path.into(),
        }
    }

    /// Parses a fully-qualified URL target.
    ///
    /// # Errors
    ///
    /// Returns `RtError::InvalidTarget` if `url` is not an absolute http(s) URL.
    pub fn parse_url(url: &str) -> Result<Self, RtError> {
        let parsed = Url::parse(url).map_err(|e| RtError::invalid_target(url, e))?;
        Self::check_scheme(&parsed)?;
        Ok(Target::Url(parsed))
    }

    /// Resolves the target into an absolute URL.
    fn resolve(&self, scheme: Scheme, api_root: &str) -> Result<Url, RtError> {
        match self {
            Target::Api { host, path } => {
                let separator = if path.is_empty() || path.starts_with('/') {
                    ""
                } else {
                    "/"
                };
                let raw = format!("{}://{}{}{}{}", scheme, host, api_root, separator, path);
                let url = Url::parse(&raw).map_err(|e| RtError::invalid_target(raw.clone(), e))?;
                if url.host_str().is_none() {
                    return Err(RtError::invalid_target(raw, "missing host"));
                }
                // Dot segments are resolved by the parser and may climb out of the root.
                if !Self::is_under_root(url.path(), api_root) {
                    return Err(RtError::invalid_target(raw, "path escapes the API root"));
                }
                Ok(url)
            }
            Target::Url(url) => {
                Self::check_scheme(url)?;
                Ok(url.clone())
            }
        }
    }

    fn is_under_root(path: &str, api_root: &str) -> bool {
        path.strip_prefix(api_root)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    fn check_scheme(url: &Url) -> Result<(), RtError> {
        match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(()),
            _ => Err(RtError::invalid_target(
                url.as_str(),
                "expected an absolute http or https URL",
            )),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Api { host, path } => write!(f, "{}{}", host, path),
            Target::Url(url) => write!(f, "{}", url),
        }
    }
}

/// A request body and its content type. Always present together.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestBody {
    bytes: Bytes,
    content_type: String,
}

impl RequestBody {
    /// Creates a body from raw bytes.
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    /// Serializes `value` as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `RtError::Serialization` if `value` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, RtError> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self::new(bytes, JSON_CONTENT_TYPE))
    }

    /// Returns the raw body bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Returns the content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBody")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Declarative description of a single API call.
///
/// One description produces exactly one network attempt when executed.
#[derive(Clone, PartialEq)]
pub struct RequestDescription {
    method: RequestMethod,
    target: Target,
    auth_mode: AuthMode,
    credentials: String,
    body: Option<RequestBody>,
    concurrency_token: Option<String>,
    query: Vec<(String, String)>,
}

impl RequestDescription {
    /// Creates an unauthenticated description with no body or query.
    pub fn new(method: RequestMethod, target: Target) -> Self {
        Self {
            method,
            target,
            auth_mode: AuthMode::None,
            credentials: String::new(),
            body: None,
            concurrency_token: None,
            query: Vec::new(),
        }
    }

    /// Creates a GET description.
    pub fn get(target: Target) -> Self {
        Self::new(RequestMethod::Get, target)
    }

    /// Creates a POST description carrying `body`.
    pub fn post(target: Target, body: RequestBody) -> Self {
        Self::new(RequestMethod::Post, target).with_body(body)
    }

    /// Creates a PUT description carrying `body`, guarded by `etag`.
    pub fn put(target: Target, body: RequestBody, etag: impl Into<String>) -> Self {
        Self::new(RequestMethod::Put, target)
            .with_body(body)
            .with_concurrency_token(etag)
    }

    /// Sets the authentication mode and credentials.
    pub fn with_auth(mut self, mode: AuthMode, credentials: impl Into<String>) -> Self {
        self.auth_mode = mode;
        self.credentials = credentials.into();
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the concurrency token sent as `If-Match`.
    pub fn with_concurrency_token(mut self, etag: impl Into<String>) -> Self {
        self.concurrency_token = Some(etag.into());
        self
    }

    /// Appends a query parameter. Repeated names are kept in order.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Appends several query parameters in order.
    pub fn with_query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Returns the method.
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    /// Returns the target.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Returns the authentication mode.
    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    /// Returns the body, if any.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Returns the concurrency token, if any.
    pub fn concurrency_token(&self) -> Option<&str> {
        self.concurrency_token.as_deref()
    }

    /// Returns the query parameters in insertion order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Builds the request against `config`.
    ///
    /// The scheme, API root and `User-Agent` come from `config`; everything
    /// else comes from the description. A body is only attached to POST and
    /// PUT requests.
    ///
    /// # Errors
    ///
    /// - `RtError::MissingConcurrencyToken` for a PUT without an ETag
    /// - `RtError::MissingContentType` for a body with an empty content type
    /// - `RtError::InvalidCredentialFormat` from the authenticator
    /// - `RtError::InvalidTarget` if the target does not form a valid URL
    /// - `RtError::InvalidHeaderValue` if a header value cannot be encoded
    pub fn build(&self, config: &Config) -> Result<FinalizedRequest, RtError> {
        guard::check(self)?;

        let authorization = auth::auth_header(self.auth_mode, &self.credentials)?;

        let mut url = self.target.resolve(config.scheme, &config.api_root)?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&config.user_agent, "User-Agent")?);

        if let Some(value) = authorization {
            headers.insert(AUTHORIZATION, value);
        }

        let mut body = None;
        if let Some(request_body) = self.body.as_ref().filter(|_| self.method.has_body()) {
            headers.insert(
                CONTENT_TYPE,
                header_value(request_body.content_type(), "Content-Type")?,
            );
            body = Some(request_body.bytes().clone());
        }

        if self.method == RequestMethod::Put {
            // Checked by the guard above.
            if let Some(etag) = &self.concurrency_token {
                headers.insert(IF_MATCH, header_value(etag, "If-Match")?);
            }
        }

        Ok(FinalizedRequest {
            method: self.method.as_method(),
            url,
            headers,
            body,
        })
    }
}

impl fmt::Debug for RequestDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescription")
            .field("method", &self.method)
            .field("target", &self.target)
            .field("auth_mode", &self.auth_mode)
            .field("credentials", &"[REDACTED]")
            .field("body", &self.body)
            .field("concurrency_token", &self.concurrency_token)
            .field("query", &self.query)
            .finish()
    }
}

fn header_value(value: &str, name: &'static str) -> Result<HeaderValue, RtError> {
    HeaderValue::from_str(value).map_err(|_| RtError::InvalidHeaderValue { name })
}

/// A fully built request: method, absolute URL, headers and optional body.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl FinalizedRequest {
    /// Returns the method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the absolute URL, including the query string.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the body, if any.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Splits the request into its parts.
    pub fn into_parts(self) -> (Method, Url, HeaderMap, Option<Bytes>) {
        (self.method, self.url, self.headers, self.body)
    }
}
