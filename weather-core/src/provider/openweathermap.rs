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

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

#[derive(Clone)]
pub struct OpenWeatherMapProvider {
    api_key: String,
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl OpenWeatherMapProvider {
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
                ("q", request.location.as_str()),
                ("units", "metric"),
                ("appid", self.api_key.as_str()),
            ],
        )
        .map_err(|e| TransportError::InvalidUrl(e.to_string()))
    }
}

impl fmt::Debug for OpenWeatherMapProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherMapProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeatherMap
    }

    async fn fetch(&self, request: &WeatherRequest) -> Result<UpstreamResponse, TransportError> {
        tracing::info!(provider = %self.id(), location = %request.location, "looking up weather");
        let url = self.request_url(request)?;
        self.transport.get(url).await
    }
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    main: OwmMain,
    wind: OwmWind,
}

/// OpenWeatherMap never embeds business errors in a 200, so a successful decode is a success.
pub(crate) fn normalize(body: &[u8]) -> Result<WeatherResponse, ProviderError> {
    let value = decode_object(body, &["main", "wind"])?;
    let parsed = OwmResponse::deserialize(&value)?;
    Ok(WeatherResponse::from_measurements(parsed.wind.speed, parsed.main.temp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ReqwestTransport;

    const MOUNTAIN_VIEW: &str = r#"{"coord":{"lon":-122.08,"lat":37.39},"weather":[{"id":800,"main":"Clear","description":"clear sky","icon":"01d"}],"base":"stations","main":{"temp":9.55,"feels_like":8.86,"temp_min":7.37,"temp_max":11.26,"pressure":1023,"humidity":100},"visibility":10000,"wind":{"speed":1.5,"deg":350},"clouds":{"all":1},"dt":1560350645,"sys":{"type":1,"id":5122,"message":0.0139,"country":"US","sunrise":1560343627,"sunset":1560396563},"timezone":-25200,"id":420006353,"name":"Mountain View","cod":200}"#;

    #[test]
    fn extracts_and_truncates_wind_and_temperature() {
        let w = normalize(MOUNTAIN_VIEW.as_bytes()).expect("valid payload");
        assert_eq!(w, WeatherResponse { wind_speed: 1, temperature_degrees: 9 });
    }

    #[test]
    fn negative_temperature_truncates_toward_zero() {
        let body = r#"{"main":{"temp":-4.8},"wind":{"speed":7.99}}"#;
        let w = normalize(body.as_bytes()).unwrap();
        assert_eq!(w, WeatherResponse { wind_speed: 7, temperature_degrees: -4 });
    }

    #[test]
    fn missing_nested_field_is_a_decode_failure() {
        let body = r#"{"main":{"temp":12.0}}"#;
        let err = normalize(body.as_bytes()).unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[test]
    fn null_reading_is_not_defaulted_to_zero() {
        let body = r#"{"main":{"temp":null},"wind":{"speed":2.0}}"#;
        assert!(normalize(body.as_bytes()).is_err());
    }

    #[test]
    fn array_body_is_a_decode_failure() {
        let err = normalize(br#"[{"temp":22.5},{"speed":5.9}]"#).unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[test]
    fn nested_array_is_a_decode_failure() {
        let err = normalize(br#"{"main":[22.5],"wind":{"speed":5.9}}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[test]
    fn request_url_uses_metric_units() {
        let provider =
            OpenWeatherMapProvider::new("KEY".into(), Arc::new(ReqwestTransport::default()));
        let url = provider.request_url(&WeatherRequest::new("Sydney")).unwrap();

        assert_eq!(
            url.as_str(),
            "http://api.openweathermap.org/data/2.5/weather?q=Sydney&units=metric&appid=KEY"
        );
    }
}
