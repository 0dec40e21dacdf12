use crate::{error::ProviderError, model::UpstreamResponse};

/// Classify an upstream reply by status code alone.
///
/// Business errors embedded in a 200 body pass through; they are caught during
/// normalization.
pub fn validate_upstream_response(resp: &UpstreamResponse) -> Result<(), ProviderError> {
    match resp.status {
        200 => Ok(()),
        404 => Err(ProviderError::NotFound),
        429 => Err(ProviderError::RateLimited),
        other => Err(ProviderError::Status(other)),
    }
}
