//! Core library for weather-aware spot suggestions.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather and place lookups that fall back to mock data on failure
//! - The ranking heuristic combining rating, weather and crowding
//! - Shared domain models (requests, spots, responses)
//!
//! It is used by `suggest-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod ranking;
pub mod service;

pub use config::{Config, HttpConfig, ProviderConfig};
pub use error::SuggestError;
pub use model::{
    CrowdLevel, DataSource, Lookup, Spot, SuggestRequest, Suggestion, WeatherInfo,
    WeatherSuitability,
};
pub use provider::{PlaceLookup, ProviderId, WeatherLookup};
pub use service::{SuggestReport, SuggestService};
