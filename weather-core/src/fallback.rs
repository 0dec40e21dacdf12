//! Primary/secondary provider fallback.

use std::sync::Arc;

use crate::{
    Config, WeatherRequest, WeatherResponse,
    error::FallbackError,
    provider::{ProviderId, WeatherProvider, provider_from_config},
    transport::HttpTransport,
};

/// Tries the primary provider once, then the secondary once.
///
/// The two calls are strictly sequential; there is no backoff and no retry
/// against the same provider.
#[derive(Debug)]
pub struct FallbackWeatherService {
    primary: Box<dyn WeatherProvider>,
    secondary: Box<dyn WeatherProvider>,
}

impl FallbackWeatherService {
    pub fn new(primary: Box<dyn WeatherProvider>, secondary: Box<dyn WeatherProvider>) -> Self {
        Self { primary, secondary }
    }

    /// WeatherStack first, OpenWeatherMap as fallback, both on `transport`.
    pub fn from_config(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(
            provider_from_config(ProviderId::WeatherStack, config, Arc::clone(&transport)),
            provider_from_config(ProviderId::OpenWeatherMap, config, transport),
        )
    }

    pub async fn get_weather(
        &self,
        request: &WeatherRequest,
    ) -> Result<WeatherResponse, FallbackError> {
        let primary = match self.primary.get_weather(request).await {
            Ok(weather) => return Ok(weather),
            Err(err) => {
                tracing::warn!(
                    provider = %self.primary.id(),
                    kind = %err.kind(),
                    error = %err,
                    "primary provider failed; falling back"
                );
                err
            }
        };

        match self.secondary.get_weather(request).await {
            Ok(weather) => Ok(weather),
            Err(secondary) => {
                tracing::error!(
                    location = %request.location,
                    primary_kind = %primary.kind(),
                    secondary_kind = %secondary.kind(),
                    error = %secondary,
                    "all weather providers failed"
                );
                Err(FallbackError {
                    primary_id: self.primary.id(),
                    primary,
                    secondary_id: self.secondary.id(),
                    secondary,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{FailureKind, ProviderError, TransportError},
        model::UpstreamResponse,
    };
    use async_trait::async_trait;
    use reqwest::Url;
    use std::{collections::VecDeque, sync::Mutex};

    const WEATHERSTACK_OK: &str =
        r#"{"current":{"observation_time":"06:20 AM","temperature":22,"wind_speed":15}}"#;
    const OPENWEATHERMAP_OK: &str = r#"{"main":{"temp":18.7},"wind":{"speed":4.2}}"#;
    const WEATHERSTACK_ENVELOPE: &str =
        r#"{"success":false,"error":{"code":101,"type":"invalid_access_key","info":"X"}}"#;

    type Scripted = Result<UpstreamResponse, TransportError>;

    /// Replays canned replies in order and records every requested URL.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Scripted>>,
        seen: Mutex<Vec<Url>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Scripted>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::default(),
            })
        }

        fn urls(&self) -> Vec<Url> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn get(&self, url: Url) -> Result<UpstreamResponse, TransportError> {
            self.seen.lock().unwrap().push(url);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Unreachable("no scripted reply".into())))
        }
    }

    fn service(transport: Arc<ScriptedTransport>) -> FallbackWeatherService {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherStack, "WS_KEY".into());
        cfg.upsert_provider_api_key(ProviderId::OpenWeatherMap, "OWM_KEY".into());
        FallbackWeatherService::from_config(&cfg, transport)
    }

    fn offline() -> Scripted {
        Err(TransportError::Unreachable("connection refused".into()))
    }

    #[tokio::test]
    async fn primary_success_skips_secondary() {
        let transport = ScriptedTransport::new(vec![Ok(UpstreamResponse::new(200, WEATHERSTACK_OK))]);
        let svc = service(transport.clone());

        let w = svc.get_weather(&WeatherRequest::default()).await.unwrap();

        assert_eq!(w, WeatherResponse { wind_speed: 15, temperature_degrees: 22 });
        let urls = transport.urls();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].host_str(), Some("api.weatherstack.com"));
    }

    #[tokio::test]
    async fn transport_failure_falls_back_to_secondary() {
        let transport = ScriptedTransport::new(vec![
            offline(),
            Ok(UpstreamResponse::new(200, OPENWEATHERMAP_OK)),
        ]);
        let svc = service(transport.clone());

        let w = svc.get_weather(&WeatherRequest::new("Perth")).await.unwrap();

        assert_eq!(w, WeatherResponse { wind_speed: 4, temperature_degrees: 18 });
        let urls = transport.urls();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[1].host_str(), Some("api.openweathermap.org"));
        assert!(urls[1].query().unwrap_or_default().contains("q=Perth"));
    }

    #[tokio::test]
    async fn error_envelope_falls_back_to_secondary() {
        let transport = ScriptedTransport::new(vec![
            Ok(UpstreamResponse::new(200, WEATHERSTACK_ENVELOPE)),
            Ok(UpstreamResponse::new(200, OPENWEATHERMAP_OK)),
        ]);
        let svc = service(transport.clone());

        let w = svc.get_weather(&WeatherRequest::default()).await.unwrap();

        assert_eq!(w.temperature_degrees, 18);
        assert_eq!(transport.urls().len(), 2);
    }

    #[tokio::test]
    async fn primary_status_failure_falls_back_once() {
        for status in [404, 429, 500] {
            let transport = ScriptedTransport::new(vec![
                Ok(UpstreamResponse::without_body(status)),
                Ok(UpstreamResponse::new(200, OPENWEATHERMAP_OK)),
            ]);
            let svc = service(transport.clone());

            assert!(svc.get_weather(&WeatherRequest::default()).await.is_ok(), "status {status}");
            assert_eq!(transport.urls().len(), 2);
        }
    }

    #[tokio::test]
    async fn both_failing_retains_both_errors() {
        let transport = ScriptedTransport::new(vec![
            Ok(UpstreamResponse::without_body(429)),
            Ok(UpstreamResponse::without_body(404)),
        ]);
        let svc = service(transport.clone());

        let err = svc.get_weather(&WeatherRequest::default()).await.unwrap_err();

        assert_eq!(err.primary_id, ProviderId::WeatherStack);
        assert_eq!(err.primary.kind(), FailureKind::RateLimited);
        assert_eq!(err.secondary_id, ProviderId::OpenWeatherMap);
        assert_eq!(err.secondary.kind(), FailureKind::NotFound);
        assert_eq!(transport.urls().len(), 2);
    }

    #[tokio::test]
    async fn secondary_empty_body_fails_closed() {
        let transport = ScriptedTransport::new(vec![offline(), Ok(UpstreamResponse::without_body(200))]);
        let svc = service(transport);

        let err = svc.get_weather(&WeatherRequest::default()).await.unwrap_err();
        assert!(matches!(err.secondary, ProviderError::EmptyBody));
    }

    #[tokio::test]
    async fn default_location_reaches_both_upstreams() {
        let transport = ScriptedTransport::new(vec![offline(), offline()]);
        let svc = service(transport.clone());

        let _ = svc.get_weather(&WeatherRequest::from_query(None)).await;

        for url in transport.urls() {
            assert!(url.as_str().contains("Sydney"), "{url}");
        }
    }
}
