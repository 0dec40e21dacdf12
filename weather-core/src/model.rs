use serde::{Deserialize, Serialize};

/// Location used when the caller does not name one.
pub const DEFAULT_LOCATION: &str = "Sydney";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRequest {
    pub location: String,
}

impl WeatherRequest {
    pub fn new(location: impl Into<String>) -> Self {
        Self { location: location.into() }
    }

    /// Build a request from an optional `query` parameter, falling back to
    /// [`DEFAULT_LOCATION`] when it is absent or empty.
    pub fn from_query(query: Option<&str>) -> Self {
        match query {
            Some(q) if !q.is_empty() => Self::new(q),
            _ => Self::new(DEFAULT_LOCATION),
        }
    }
}

impl Default for WeatherRequest {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION)
    }
}

/// Raw upstream reply as handed back by an [`HttpTransport`](crate::transport::HttpTransport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Option<Vec<u8>>,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: Some(body.into()) }
    }

    pub fn without_body(status: u16) -> Self {
        Self { status, body: None }
    }
}

/// Canonical shape returned to clients regardless of which provider answered.
///
/// Field order is part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub wind_speed: i64,
    pub temperature_degrees: i64,
}

impl WeatherResponse {
    /// Discards fractional parts; upstream readings are never rounded.
    pub fn from_measurements(wind_speed: f64, temperature: f64) -> Self {
        Self {
            wind_speed: wind_speed.trunc() as i64,
            temperature_degrees: temperature.trunc() as i64,
        }
    }
}
