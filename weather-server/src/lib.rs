//! HTTP surface of the weather proxy.
//!
//! Exposes `GET /v1/weather?query=<location>` backed by
//! [`weather_core::FallbackWeatherService`].

pub mod http;

pub use http::{AppState, router, serve};
