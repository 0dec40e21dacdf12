use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use weather_core::{
    Config, FallbackError, FallbackWeatherService, ReqwestTransport, WeatherRequest,
    WeatherResponse,
};

/// Shared state for HTTP handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub weather: Arc<FallbackWeatherService>,
}

impl AppState {
    pub fn new(weather: FallbackWeatherService) -> Self {
        Self { weather: Arc::new(weather) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/weather", get(get_weather))
        .with_state(state)
}

/// First `query` value from the query string; repeats and unknown params are ignored.
fn first_query(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(name, _)| name == "query")
        .map(|(_, value)| value.as_str())
}

async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<WeatherResponse>, ApiError> {
    let request = WeatherRequest::from_query(first_query(&params));
    let weather = state.weather.get_weather(&request).await?;
    Ok(Json(weather))
}

/// Exhausted fallback, always reported as 503 with a plain-text body.
#[derive(Debug)]
pub struct ApiError(FallbackError);

impl From<FallbackError> for ApiError {
    fn from(err: FallbackError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = format!("Error: {}", self.0.user_message());
        (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
    }
}

/// Bind `config.server.bind` and serve until the process is stopped.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let timeout = Duration::from_secs(config.server.upstream_timeout_secs);
    let transport =
        ReqwestTransport::with_timeout(timeout).context("Failed to build upstream HTTP client")?;
    let service = FallbackWeatherService::from_config(&config, Arc::new(transport));
    let app = router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!(addr = %config.server.bind, "weather proxy listening");

    axum::serve(listener, app).await.context("HTTP server terminated")?;
    Ok(())
}
