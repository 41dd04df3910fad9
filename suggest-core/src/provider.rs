use crate::{
    Config, Lookup, Spot, WeatherInfo,
    provider::{google_places::GooglePlacesLookup, openweather::OpenWeatherLookup},
};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

pub mod google_places;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    GooglePlaces,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::GooglePlaces => "googleplaces",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::GooglePlaces]
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
            "openweather" => Ok(ProviderId::OpenWeather),
            "googleplaces" => Ok(ProviderId::GooglePlaces),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, googleplaces."
            )),
        }
    }
}

/// Current weather at a point. Never fails: failures yield fallback data.
#[async_trait]
pub trait WeatherLookup: Send + Sync + Debug {
    async fn current_weather(&self, lat: f64, lng: f64) -> Lookup<WeatherInfo>;
}

/// Points of interest near a point. Never fails: failures yield fallback data.
#[async_trait]
pub trait PlaceLookup: Send + Sync + Debug {
    async fn nearby_spots(&self, lat: f64, lng: f64) -> Lookup<Vec<Spot>>;
}

/// HTTP client shared by the providers, bounded by the configured timeout.
pub fn http_client(config: &Config) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("suggest/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Construct the weather lookup from config. A missing API key selects mock data.
pub fn weather_lookup_from_config(
    config: &Config,
    http: Client,
) -> Box<dyn WeatherLookup> {
    let id = ProviderId::OpenWeather;
    let mut lookup = OpenWeatherLookup::new(config.provider_api_key(id).map(str::to_owned), http);
    if let Some(base_url) = config.provider_base_url(id) {
        lookup = lookup.with_base_url(base_url);
    }
    Box::new(lookup)
}

/// Construct the place lookup from config. A missing API key selects mock data.
pub fn place_lookup_from_config(config: &Config, http: Client) -> Box<dyn PlaceLookup> {
    let id = ProviderId::GooglePlaces;
    let mut lookup = GooglePlacesLookup::new(config.provider_api_key(id).map(str::to_owned), http);
    if let Some(base_url) = config.provider_base_url(id) {
        lookup = lookup.with_base_url(base_url);
    }
    Box::new(lookup)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
