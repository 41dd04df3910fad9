use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use tracing::{debug, instrument, warn};

use crate::model::{Lookup, Spot};

use super::{PlaceLookup, truncate_body};

const PLACES_BASE: &str = "https://maps.googleapis.com";
const NEARBY_SEARCH_PATH: &str = "/maps/api/place/nearbysearch/json";

/// Search radius in meters.
pub const SEARCH_RADIUS_M: u32 = 2000;
/// The only place category requested from the provider.
pub const SEARCH_TYPE: &str = "tourist_attraction";

/// Spots returned when no API key is configured.
pub fn unconfigured_spots(lat: f64, lng: f64) -> Vec<Spot> {
    vec![
        Spot::new("Mock Temple", lat + 0.001, lng + 0.001, 4.5, 1000, &["tourist_attraction"]),
        Spot::new("Mock Park", lat - 0.001, lng - 0.001, 4.2, 500, &["park"]),
        Spot::new("Mock Museum", lat + 0.002, lng - 0.002, 4.8, 200, &["museum"]),
        Spot::new("Mock Cafe", lat - 0.002, lng + 0.002, 3.9, 50, &["cafe"]),
    ]
}

/// Spots returned when the Places call fails.
pub fn fallback_spots(lat: f64, lng: f64) -> Vec<Spot> {
    vec![
        Spot::new(
            "Mock Temple (API Error Fallback)",
            lat + 0.001,
            lng + 0.001,
            4.5,
            1000,
            &["tourist_attraction"],
        ),
        Spot::new("Mock Park", lat - 0.001, lng - 0.001, 4.2, 500, &["park"]),
        Spot::new("Mock Museum", lat + 0.002, lng - 0.002, 4.8, 200, &["museum"]),
    ]
}

#[derive(Clone)]
pub struct GooglePlacesLookup {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for GooglePlacesLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GooglePlacesLookup")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GooglePlacesLookup {
    pub fn new(api_key: Option<String>, http: Client) -> Self {
        Self {
            api_key,
            base_url: PLACES_BASE.to_string(),
            http,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn fetch_nearby(&self, api_key: &str, lat: f64, lng: f64) -> Result<Vec<Spot>> {
        let url = format!("{}{}", self.base_url, NEARBY_SEARCH_PATH);
        let location = format!("{lat:.6},{lng:.6}");
        let radius = SEARCH_RADIUS_M.to_string();

        debug!(%url, %location, "Requesting nearby places");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", SEARCH_TYPE),
                ("key", api_key),
            ])
            .send()
            .await
            // The query string carries the API key.
            .map_err(reqwest::Error::without_url)
            .context("Failed to send request to Google Places (nearby search)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read Google Places response body")?;

        if status != StatusCode::OK {
            return Err(anyhow!(
                "Google Places request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: NearbySearchResponse =
            serde_json::from_str(&body).context("Failed to parse Google Places JSON")?;

        match parsed.status.as_str() {
            "OK" | "ZERO_RESULTS" => {}
            other => {
                let detail = parsed.error_message.unwrap_or_default();
                return Err(anyhow!("Google Places returned status {other}: {detail}"));
            }
        }

        Ok(parsed.results.into_iter().map(Spot::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceResult>,
}

/// Missing and `null` fields both decode to the type's default, so one sparse
/// result cannot fail the whole response.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    #[serde(default, deserialize_with = "null_as_default")]
    place_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    geometry: PlaceGeometry,
    #[serde(default, deserialize_with = "null_as_default")]
    rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    user_ratings_total: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    types: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    photos: Vec<PlacePhoto>,
}

#[derive(Debug, Default, Deserialize)]
struct PlaceGeometry {
    #[serde(default, deserialize_with = "null_as_default")]
    location: LatLng,
}

#[derive(Debug, Default, Deserialize)]
struct LatLng {
    #[serde(default, deserialize_with = "null_as_default")]
    lat: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct PlacePhoto {
    #[serde(default, deserialize_with = "null_as_default")]
    photo_reference: String,
}

impl From<PlaceResult> for Spot {
    fn from(place: PlaceResult) -> Self {
        Spot {
            id: place.place_id,
            name: place.name,
            latitude: place.geometry.location.lat,
            longitude: place.geometry.location.lng,
            rating: place.rating,
            user_ratings_total: place.user_ratings_total,
            types: place.types,
            photo_reference: place
                .photos
                .into_iter()
                .next()
                .map(|p| p.photo_reference)
                .filter(|r| !r.is_empty()),
            crowd_level: None,
            weather_suitability: None,
            score: 0.0,
        }
    }
}

#[async_trait]
impl PlaceLookup for GooglePlacesLookup {
    #[instrument(skip(self), level = "info")]
    async fn nearby_spots(&self, lat: f64, lng: f64) -> Lookup<Vec<Spot>> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("No Google Places API key configured, using mock spots");
            return Lookup::Unconfigured(unconfigured_spots(lat, lng));
        };

        match self.fetch_nearby(api_key, lat, lng).await {
            Ok(spots) => {
                debug!(count = spots.len(), "Google Places returned spots");
                Lookup::Live(spots)
            }
            Err(err) => {
                let cause = format!("{err:#}");
                warn!(%cause, "Place lookup failed, using mock data");
                Lookup::Fallback { value: fallback_spots(lat, lng), cause }
            }
        }
    }
}
