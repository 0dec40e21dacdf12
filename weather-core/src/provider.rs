use crate::{
    Config, WeatherRequest, WeatherResponse,
    error::{ProviderError, TransportError},
    model::UpstreamResponse,
    provider::{openweathermap::OpenWeatherMapProvider, weatherstack::WeatherStackProvider},
    transport::HttpTransport,
    validate::validate_upstream_response,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweathermap;
pub mod weatherstack;

/// The closed set of upstreams, in fallback priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    WeatherStack,
    OpenWeatherMap,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::WeatherStack => "weatherstack",
            ProviderId::OpenWeatherMap => "openweathermap",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::WeatherStack, ProviderId::OpenWeatherMap]
    }

    /// Environment variable holding this provider's credential.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderId::WeatherStack => "WEATHERSTACK_KEY",
            ProviderId::OpenWeatherMap => "OPENWEATHERMAP_KEY",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "weatherstack" => Ok(ProviderId::WeatherStack),
            "openweathermap" => Ok(ProviderId::OpenWeatherMap),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: weatherstack, openweathermap."
            )),
        }
    }
}

/// One upstream adapter: builds the provider request and hands it to the transport.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Single outbound call; no retries at this layer.
    async fn fetch(&self, request: &WeatherRequest) -> Result<UpstreamResponse, TransportError>;

    /// Fetch, validate and normalize in one attempt.
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherResponse, ProviderError> {
        let resp = self.fetch(request).await?;
        validate_upstream_response(&resp)?;
        normalize(self.id(), resp.body.as_deref())
    }
}

/// Decode a validated body with the schema of `id` and map it to the canonical shape.
pub fn normalize(id: ProviderId, body: Option<&[u8]>) -> Result<WeatherResponse, ProviderError> {
    let body = body.ok_or(ProviderError::EmptyBody)?;

    match id {
        ProviderId::WeatherStack => weatherstack::normalize(body),
        ProviderId::OpenWeatherMap => openweathermap::normalize(body),
    }
}

/// Parse a body that must be a JSON object whose `nested` members, when present
/// and non-null, are objects too.
///
/// Derived `Deserialize` impls also accept sequences, so `[{..},{..}]` would
/// otherwise decode field-by-position.
pub(crate) fn decode_object(
    body: &[u8],
    nested: &[&str],
) -> Result<serde_json::Value, ProviderError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;

    if !value.is_object() {
        return Err(structure_error("payload is not a JSON object"));
    }
    for key in nested {
        match value.get(*key) {
            None | Some(serde_json::Value::Null) | Some(serde_json::Value::Object(_)) => {}
            Some(_) => return Err(structure_error(&format!("`{key}` is not a JSON object"))),
        }
    }

    Ok(value)
}

fn structure_error(msg: &str) -> ProviderError {
    ProviderError::Decode(<serde_json::Error as serde::de::Error>::custom(msg))
}

/// Construct a provider from config, sharing `transport`.
///
/// A missing API key is tolerated here: the provider is built with an empty key
/// and its requests fail upstream, which hands over to the next provider.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
    transport: Arc<dyn HttpTransport>,
) -> Box<dyn WeatherProvider> {
    let api_key = match config.provider_api_key(id) {
        Some(key) if !key.is_empty() => key.to_owned(),
        _ => {
            tracing::warn!(
                provider = %id,
                env = id.api_key_env(),
                "no API key configured; requests to this provider will fail"
            );
            String::new()
        }
    };
    let base_url = config.provider_base_url(id);

    match id {
        ProviderId::WeatherStack => {
            let mut p = WeatherStackProvider::new(api_key, transport);
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Box::new(p)
        }
        ProviderId::OpenWeatherMap => {
            let mut p = OpenWeatherMapProvider::new(api_key, transport);
            if let Some(url) = base_url {
                p = p.with_base_url(url);
            }
            Box::new(p)
        }
    }
}
