use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::{fmt, sync::Arc};

use crate::{
    error::{ProviderError, TransportError},
    model::{UpstreamResponse, WeatherRequest, WeatherResponse},
    transport::HttpTransport,
};

use super::{ProviderId, WeatherProvider, decode_object};

pub const DEFAULT_BASE_URL: &str = "http://api.weatherstack.com/current";

#[derive(Clone)]
pub struct WeatherStackProvider {
    api_key: String,
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl WeatherStackProvider {
    pub fn new(api_key: String, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            transport,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn request_url(&self, request: &WeatherRequest) -> Result<Url, TransportError> {
        Url::parse_with_params(
            &self.base_url,
            &[
                ("access_key", self.api_key.as_str()),
                ("query", request.location.as_str()),
            ],
        )
        .map_err(|e| TransportError::InvalidUrl(e.to_string()))
    }
}

impl fmt::Debug for WeatherStackProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherStackProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl WeatherProvider for WeatherStackProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherStack
    }

    async fn fetch(&self, request: &WeatherRequest) -> Result<UpstreamResponse, TransportError> {
        tracing::info!(provider = %self.id(), location = %request.location, "looking up weather");
        let url = self.request_url(request)?;
        self.transport.get(url).await
    }
}

#[derive(Debug, Deserialize)]
struct WsCurrent {
    observation_time: Option<String>,
    temperature: Option<f64>,
    wind_speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WsResponse {
    current: Option<WsCurrent>,
}

#[derive(Debug, Deserialize)]
struct WsErrorInfo {
    code: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    info: Option<String>,
}

/// Shape WeatherStack uses for business errors, even on status 200.
#[derive(Debug, Deserialize)]
struct WsErrorEnvelope {
    success: Option<bool>,
    error: Option<WsErrorInfo>,
}

/// Map a WeatherStack body to the canonical shape.
///
/// A non-empty `observation_time` is the only success signal: a temperature of
/// zero is a real reading, so it cannot tell an error payload from a valid one.
pub(crate) fn normalize(body: &[u8]) -> Result<WeatherResponse, ProviderError> {
    let value = decode_object(body, &["current", "error"])?;
    let parsed = WsResponse::deserialize(&value)?;

    let observed = parsed
        .current
        .filter(|c| c.observation_time.as_deref().is_some_and(|t| !t.is_empty()));

    if let Some(current) = observed {
        let wind_speed = current.wind_speed.ok_or_else(|| missing_field("wind_speed"))?;
        let temperature = current.temperature.ok_or_else(|| missing_field("temperature"))?;
        return Ok(WeatherResponse::from_measurements(wind_speed, temperature));
    }

    let envelope = WsErrorEnvelope::deserialize(&value)?;
    let (code, kind, info) = match envelope.error {
        Some(e) => (e.code, e.kind, e.info),
        None => (None, None, None),
    };

    tracing::warn!(
        provider = %ProviderId::WeatherStack,
        success = ?envelope.success,
        code = ?code,
        kind = ?kind,
        "payload carried no observation"
    );

    Err(ProviderError::Rejected(
        info.unwrap_or_else(|| "response contained no current observation".to_string()),
    ))
}

fn missing_field(field: &'static str) -> ProviderError {
    ProviderError::Decode(<serde_json::Error as serde::de::Error>::missing_field(field))
}
