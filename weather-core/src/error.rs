//! Error types shared by adapters, the validator and the fallback service.

use thiserror::Error;

use crate::provider::ProviderId;

/// Failure to obtain any HTTP response at all.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// For `HttpTransport` impls that fail without a `reqwest::Error`;
    /// `ReqwestTransport` reports through `Request`.
    #[error("upstream unreachable: {0}")]
    Unreachable(String),
}

/// Coarse classification used for logging and fallback decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Transport,
    NotFound,
    RateLimited,
    Upstream,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transport => "transport",
            FailureKind::NotFound => "not_found",
            FailureKind::RateLimited => "rate_limited",
            FailureKind::Upstream => "upstream",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single provider attempt failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("location not found upstream")]
    NotFound,

    #[error("upstream rate limit exceeded")]
    RateLimited,

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("upstream response had no body")]
    EmptyBody,

    #[error("malformed upstream payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("upstream rejected the request: {0}")]
    Rejected(String),
}

impl ProviderError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::Transport,
            Self::NotFound => FailureKind::NotFound,
            Self::RateLimited => FailureKind::RateLimited,
            Self::Status(_) | Self::EmptyBody | Self::Decode(_) | Self::Rejected(_) => {
                FailureKind::Upstream
            }
        }
    }

    /// Client-safe message; never echoes upstream payload text.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            FailureKind::Transport => "The weather service could not be reached",
            FailureKind::NotFound => "The query for that location returned an empty result",
            FailureKind::RateLimited => "The weather service is busy right now try again soon",
            FailureKind::Upstream => "The upstream service returned an error",
        }
    }
}

/// Both providers failed for one request.
#[derive(Debug, Error)]
#[error("all weather providers failed ({primary_id}: {primary}; {secondary_id}: {secondary})")]
pub struct FallbackError {
    pub primary_id: ProviderId,
    pub primary: ProviderError,
    pub secondary_id: ProviderId,
    pub secondary: ProviderError,
}

impl FallbackError {
    pub fn user_message(&self) -> String {
        format!("all weather providers failed: {}", self.secondary.user_message())
    }
}
