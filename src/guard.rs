//! Preconditions checked before a request is built.

use crate::error::RtError;
use crate::request::{RequestDescription, RequestMethod};

/// Checks that `description` satisfies the preconditions of its method.
///
/// Updates must carry a non-empty concurrency token, since RT answers a PUT
/// without `If-Match` by overwriting whatever changed in between. The token
/// is opaque and is not trimmed or otherwise inspected. Bodies on POST and
/// PUT must name their content type.
///
/// # Errors
///
/// - `RtError::MissingConcurrencyToken` for a PUT without a non-empty ETag
/// - `RtError::MissingContentType` for a POST or PUT body with an empty content type
pub fn check(description: &RequestDescription) -> Result<(), RtError> {
    let method = description.method();

    if method == RequestMethod::Put
        && description
            .concurrency_token()
            .map_or(true, str::is_empty)
    {
        return Err(RtError::MissingConcurrencyToken);
    }

    if method.has_body() {
        if let Some(body) = description.body() {
            if body.content_type().trim().is_empty() {
                return Err(RtError::MissingContentType);
            }
        }
    }

    Ok(())
}
