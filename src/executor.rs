//! Request execution.
//!
//! Sends one finalized request through a [`Transport`] and hands back the raw
//! response. There is no retry: a failed send is terminal, and every kind of
//! transport failure surfaces as `RtError::NetworkRequestFailed` with the
//! original error kept as its source.
//!
//! Dropping the returned future abandons the in-flight request; nothing is
//! resumed afterwards.

use std::time::Duration;

use crate::error::RtError;
use crate::request::FinalizedRequest;
use crate::response::Response;
use crate::transport::Transport;

/// Sends `request` through `transport`, bounded by `timeout`.
///
/// The response is returned unmodified whatever its status.
///
/// # Errors
///
/// Returns `RtError::NetworkRequestFailed` if the transport fails for any reason.
pub async fn execute<T: Transport>(
    transport: &T,
    request: FinalizedRequest,
    timeout: Duration,
) -> Result<Response, RtError> {
    let method = request.method().clone();
    let url = request.url().clone();

    tracing::debug!(method = %method, url = %url, "Making RT API request");

    let response = transport.send(request, timeout).await.map_err(|e| {
        tracing::warn!(method = %method, url = %url, error = %e, "RT API request failed");
        RtError::network(method.clone(), &url, e)
    })?;

    tracing::debug!(
        method = %method,
        url = %url,
        status = %response.status(),
        bytes = response.body().len(),
        "RT API response received"
    );

    Ok(response)
}
