//! Authorization header construction.
//!
//! RT REST 2.0 accepts HTTP basic authentication and auth tokens
//! (`Authorization: token <value>`). Basic credentials are checked for the
//! `user:password` shape before encoding; tokens are passed through as-is.

use std::fmt;
use std::str::FromStr;

use base64::prelude::*;
use http::HeaderValue;

use crate::error::RtError;

/// How a request authenticates against the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// HTTP basic authentication with `user:password` credentials.
    Basic,
    /// RT auth token.
    #[default]
    Token,
    /// No `Authorization` header at all.
    None,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthMode::Basic => "basic",
            AuthMode::Token => "token",
            AuthMode::None => "none",
        };
        f.write_str(name)
    }
}

impl FromStr for AuthMode {
    type Err = RtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(AuthMode::Basic),
            "token" => Ok(AuthMode::Token),
            "none" => Ok(AuthMode::None),
            other => Err(RtError::invalid_config(format!(
                "unknown auth mode {:?}, expected basic, token or none",
                other
            ))),
        }
    }
}

/// Produces the `Authorization` header value for `mode` and `credentials`.
///
/// Returns `Ok(None)` for [`AuthMode::None`]: the header is absent, not empty.
/// The returned value is marked sensitive so it is hidden from `Debug` output.
///
/// # Errors
///
/// - `RtError::InvalidCredentialFormat` if `mode` is `Basic` and the
///   credentials contain no `:`.
/// - `RtError::InvalidHeaderValue` if a token contains bytes that cannot
///   appear in a header (control characters).
pub fn auth_header(mode: AuthMode, credentials: &str) -> Result<Option<HeaderValue>, RtError> {
    let value = match mode {
        AuthMode::None => return Ok(None),
        AuthMode::Basic => {
            if !credentials.contains(':') {
                return Err(RtError::InvalidCredentialFormat);
            }
            format!("Basic {}", BASE64_STANDARD.encode(credentials.as_bytes()))
        }
        // Tokens are not validated, an empty token is sent as "token ".
        AuthMode::Token => format!("token {}", credentials),
    };

    let mut value = HeaderValue::from_str(&value).map_err(|_| RtError::InvalidHeaderValue {
        name: "Authorization",
    })?;
    value.set_sensitive(true);
    Ok(Some(value))
}

/// Returns every form in which `credentials` can appear on the wire for `mode`.
///
/// For Basic this is the full `user:password`, the password alone and the
/// base64 header encoding. Used to scrub server-echoed text.
pub fn secret_forms(mode: AuthMode, credentials: &str) -> Vec<String> {
    let mut forms = Vec::new();
    if credentials.is_empty() {
        return forms;
    }

    match mode {
        AuthMode::None => {}
        AuthMode::Token => forms.push(credentials.to_string()),
        AuthMode::Basic => {
            forms.push(credentials.to_string());
            forms.push(BASE64_STANDARD.encode(credentials.as_bytes()));
            if let Some((_, password)) = credentials.split_once(':') {
                if !password.is_empty() {
                    forms.push(password.to_string());
                }
            }
        }
    }
    forms
}
