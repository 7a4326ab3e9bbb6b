//! Configuration for the RT client.
//!
//! A `Config` fixes everything that stays constant for one client instance:
//! the server host and scheme, the API root prefix, the identification
//! header, authentication, the per-request timeout and the pagination bound.
//! It can be built in code or loaded from environment variables.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::auth::AuthMode;
use crate::error::RtError;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path prefix of the RT REST 2.0 API.
pub const DEFAULT_API_ROOT: &str = "/REST/2.0";

/// Default value of the `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("rt-client/", env!("CARGO_PKG_VERSION"));

/// Default maximum number of pages walked by one aggregation.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// URL scheme used for every request of a client instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    #[default]
    Https,
}

impl Scheme {
    /// Returns the scheme as it appears in a URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for connecting to an RT server.
///
/// The credentials are stored but never logged; the `Debug` output redacts them.
#[derive(Clone)]
pub struct Config {
    /// RT host, optionally with a port (e.g. `rt.example.com` or `localhost:8080`).
    pub host: String,

    /// Scheme used to reach the host.
    pub scheme: Scheme,

    /// Path prefix placed between the host and every API path.
    pub api_root: String,

    /// Value of the `User-Agent` header sent with every request.
    pub user_agent: String,

    /// How requests authenticate.
    pub auth_mode: AuthMode,

    /// `user:password` for basic auth, the token for token auth.
    /// This value must never be logged or included in error messages.
    credentials: String,

    /// Timeout applied to each individual request.
    pub timeout: Duration,

    /// Upper bound on pages walked by one aggregation, `None` for unbounded.
    pub max_pages: Option<usize>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("scheme", &self.scheme)
            .field("api_root", &self.api_root)
            .field("user_agent", &self.user_agent)
            .field("auth_mode", &self.auth_mode)
            .field("credentials", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}

impl Config {
    /// Creates a configuration with default scheme, API root, timeout and page limit.
    ///
    /// # Errors
    ///
    /// Returns `RtError::Config` if the host is not a bare host name.
    pub fn new(
        host: impl Into<String>,
        auth_mode: AuthMode,
        credentials: impl Into<String>,
    ) -> Result<Self, RtError> {
        let host = Self::validate_host(host.into())?;

        Ok(Config {
            host,
            scheme: Scheme::default(),
            api_root: DEFAULT_API_ROOT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            auth_mode,
            credentials: credentials.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_pages: Some(DEFAULT_MAX_PAGES),
        })
    }

    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RT_HOST` (required): host of the RT server, optionally with a port
    /// - `RT_AUTH_MODE`: `basic`, `token` or `none` (default `token`)
    /// - `RT_CREDENTIALS`: required unless the auth mode is `none`
    /// - `RT_SCHEME`: `https` or `http` (default `https`)
    /// - `RT_TIMEOUT_SECS`: per-request timeout (default 30)
    /// - `RT_MAX_PAGES`: page limit per aggregation, `0` for unbounded (default 1000)
    ///
    /// # Errors
    ///
    /// Returns `RtError::Config` if a required variable is missing or a value
    /// fails validation.
    pub fn from_env() -> Result<Self, RtError> {
        let host = Self::get_required_env("RT_HOST")?;

        let auth_mode = match Self::get_optional_env("RT_AUTH_MODE") {
            Some(mode) => mode.parse()?,
            None => AuthMode::default(),
        };

        let credentials = match auth_mode {
            AuthMode::None => String::new(),
            _ => Self::get_required_env("RT_CREDENTIALS")?,
        };
        Self::validate_credentials(&credentials)?;

        let mut config = Config::new(host, auth_mode, credentials)?;

        if let Some(scheme) = Self::get_optional_env("RT_SCHEME") {
            config.scheme = Self::parse_scheme(&scheme)?;
        }

        if let Some(secs) = Self::get_optional_env("RT_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                RtError::invalid_config("RT_TIMEOUT_SECS must be a whole number of seconds")
            })?;
            config = config.with_timeout(Duration::from_secs(secs))?;
        }

        if let Some(pages) = Self::get_optional_env("RT_MAX_PAGES") {
            let pages: usize = pages.trim().parse().map_err(|_| {
                RtError::invalid_config("RT_MAX_PAGES must be a non-negative integer")
            })?;
            config.max_pages = (pages > 0).then_some(pages);
        }

        Ok(config)
    }

    /// Returns the credentials.
    ///
    /// This should only be used to authenticate requests or sanitize messages,
    /// never for logging.
    pub fn credentials(&self) -> &str {
        &self.credentials
    }

    /// Sets the URL scheme.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the API root prefix.
    ///
    /// # Errors
    ///
    /// Returns `RtError::Config` if the prefix does not start with `/`.
    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Result<Self, RtError> {
        let api_root = api_root.into();
        if !api_root.starts_with('/') {
            return Err(RtError::invalid_config("API root must start with '/'"));
        }
        self.api_root = api_root.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Sets the `User-Agent` header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `RtError::Config` for a zero timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, RtError> {
        if timeout.is_zero() {
            return Err(RtError::invalid_config("timeout must be greater than zero"));
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// Sets the page limit, `None` or `Some(0)` for unbounded walks.
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages.filter(|&pages| pages > 0);
        self
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, RtError> {
        Self::get_optional_env(name).ok_or_else(|| RtError::missing_env(name))
    }

    /// Gets an optional environment variable, treating blank values as unset.
    fn get_optional_env(name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.trim().is_empty())
    }

    fn parse_scheme(value: &str) -> Result<Scheme, RtError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "https" => Ok(Scheme::Https),
            "http" => Ok(Scheme::Http),
            _ => Err(RtError::invalid_config("RT_SCHEME must be http or https")),
        }
    }

    /// Validates and normalizes the host.
    fn validate_host(host: String) -> Result<String, RtError> {
        let host = host.trim().trim_end_matches('/').to_string();

        if host.is_empty() {
            return Err(RtError::invalid_config("RT host must not be empty"));
        }

        if host.contains("://") {
            return Err(RtError::invalid_config(
                "RT host must not include a scheme, set the scheme separately",
            ));
        }

        if host.contains('/') || host.chars().any(char::is_whitespace) {
            return Err(RtError::invalid_config(
                "RT host must be a bare host name, optionally with a port",
            ));
        }

        Ok(host)
    }

    /// Validates the credentials are not a placeholder value.
    fn validate_credentials(credentials: &str) -> Result<(), RtError> {
        let lower = credentials.to_lowercase();
        let placeholder_patterns = ["your_token", "your_password", "placeholder", "changeme"];

        if placeholder_patterns.iter().any(|pattern| lower.contains(pattern)) {
            return Err(RtError::invalid_config(
                "RT_CREDENTIALS appears to be a placeholder value",
            ));
        }

        Ok(())
    }
}
