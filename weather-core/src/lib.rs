//! Core library for the weather proxy.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Provider adapters and per-provider normalization
//! - Primary/secondary fallback between providers
//! - Shared domain models (requests, responses)
//!
//! The outbound HTTP client is injected through [`HttpTransport`], so the
//! pipeline can run against any transport, including in-memory test doubles.

pub mod config;
pub mod error;
pub mod fallback;
pub mod model;
pub mod provider;
pub mod transport;
pub mod validate;

pub use config::{Config, ProviderConfig, ServerConfig};
pub use error::{FailureKind, FallbackError, ProviderError, TransportError};
pub use fallback::FallbackWeatherService;
pub use model::{DEFAULT_LOCATION, UpstreamResponse, WeatherRequest, WeatherResponse};
pub use provider::{ProviderId, WeatherProvider, normalize};
pub use transport::{HttpTransport, ReqwestTransport};
pub use validate::validate_upstream_response;

pub use reqwest::Url;
