//! Composition of the two lookups and the ranking engine.

use tracing::{info, instrument, warn};

use crate::{
    Config, DataSource, SuggestError, SuggestRequest, Suggestion,
    provider::{self, PlaceLookup, WeatherLookup},
    ranking,
};

/// A [`Suggestion`] together with where its inputs came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestReport {
    pub suggestion: Suggestion,
    pub weather_source: DataSource,
    pub places_source: DataSource,
}

impl SuggestReport {
    /// True when both lookups returned real upstream data.
    pub fn is_live(&self) -> bool {
        self.weather_source == DataSource::Live && self.places_source == DataSource::Live
    }
}

#[derive(Debug)]
pub struct SuggestService {
    weather: Box<dyn WeatherLookup>,
    places: Box<dyn PlaceLookup>,
}

impl SuggestService {
    pub fn new(weather: Box<dyn WeatherLookup>, places: Box<dyn PlaceLookup>) -> Self {
        Self { weather, places }
    }

    /// Build both lookups from config, sharing one HTTP client.
    pub fn from_config(config: &Config) -> Result<Self, SuggestError> {
        config.validate()?;
        let http = provider::http_client(config)?;
        Ok(Self::new(
            provider::weather_lookup_from_config(config, http.clone()),
            provider::place_lookup_from_config(config, http),
        ))
    }

    pub async fn suggest(&self, request: &SuggestRequest) -> Result<Suggestion, SuggestError> {
        Ok(self.suggest_detailed(request).await?.suggestion)
    }

    #[instrument(skip(self), level = "info")]
    pub async fn suggest_detailed(
        &self,
        request: &SuggestRequest,
    ) -> Result<SuggestReport, SuggestError> {
        validate_coordinates(request.lat, request.lng)?;

        let weather = self.weather.current_weather(request.lat, request.lng).await;
        let places = self.places.nearby_spots(request.lat, request.lng).await;

        let weather_source = weather.source();
        let places_source = places.source();
        if weather_source == DataSource::Fallback || places_source == DataSource::Fallback {
            warn!(?weather_source, ?places_source, "Serving suggestions from degraded data");
        }

        let weather = weather.into_value();
        let candidates = places.into_value();
        let candidate_count = candidates.len();
        let suggestions = ranking::rank(&weather, candidates);

        info!(
            candidates = candidate_count,
            returned = suggestions.len(),
            "Ranked nearby spots"
        );

        Ok(SuggestReport {
            suggestion: Suggestion { weather, suggestions },
            weather_source,
            places_source,
        })
    }
}

fn validate_coordinates(lat: f64, lng: f64) -> Result<(), SuggestError> {
    let valid = lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng);

    if valid {
        Ok(())
    } else {
        Err(SuggestError::InvalidCoordinates { lat, lng })
    }
}
