use serde::{Deserialize, Serialize};

/// Inbound request: the point to suggest spots around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub lat: f64,
    pub lng: f64,
}

/// Current conditions at the requested point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    /// Category, e.g. "Clear" or "Rain".
    pub main: String,
    pub description: String,
    /// Degrees Celsius.
    #[serde(rename = "temp")]
    pub temperature: f64,
}

impl WeatherInfo {
    pub fn new(main: impl Into<String>, description: impl Into<String>, temperature: f64) -> Self {
        Self {
            main: main.into(),
            description: description.into(),
            temperature,
        }
    }

    /// True when either the category or the description mentions rain.
    pub fn is_raining(&self) -> bool {
        self.main.to_lowercase().contains("rain") || self.description.to_lowercase().contains("rain")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrowdLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherSuitability {
    #[serde(rename = "Good (Indoor)")]
    GoodIndoor,
    #[serde(rename = "Bad (Outdoor)")]
    BadOutdoor,
    #[serde(rename = "Good (Outdoor)")]
    GoodOutdoor,
    #[serde(rename = "Neutral")]
    Neutral,
}

impl WeatherSuitability {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherSuitability::GoodIndoor => "Good (Indoor)",
            WeatherSuitability::BadOutdoor => "Bad (Outdoor)",
            WeatherSuitability::GoodOutdoor => "Good (Outdoor)",
            WeatherSuitability::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for WeatherSuitability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for CrowdLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CrowdLevel::High => "High",
            CrowdLevel::Medium => "Medium",
            CrowdLevel::Low => "Low",
        };
        f.write_str(s)
    }
}

/// A point of interest near the requested location.
///
/// `crowd_level`, `weather_suitability` and `score` are only filled in by
/// [`crate::ranking::rank`] and are meaningful for that weather only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    /// Provider place id. Empty for mock spots.
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Provider rating on a 0-5 scale.
    pub rating: f64,
    pub user_ratings_total: u32,
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crowd_level: Option<CrowdLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_suitability: Option<WeatherSuitability>,
    #[serde(default)]
    pub score: f64,
}

impl Spot {
    /// Unranked spot without id or photo, as used for mock data.
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        rating: f64,
        user_ratings_total: u32,
        types: &[&str],
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            latitude,
            longitude,
            rating,
            user_ratings_total,
            types: types.iter().map(|t| t.to_string()).collect(),
            photo_reference: None,
            crowd_level: None,
            weather_suitability: None,
            score: 0.0,
        }
    }
}

/// Response of a suggest call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub weather: WeatherInfo,
    pub suggestions: Vec<Spot>,
}

/// Where a lookup's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Unconfigured,
    Fallback,
}

/// Outcome of a weather or place lookup.
///
/// Lookups never fail: when no credential is configured, or the upstream call
/// fails in any way, a fixed mock value is returned instead. The variant tells
/// callers which of the three happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Live(T),
    Unconfigured(T),
    Fallback { value: T, cause: String },
}

impl<T> Lookup<T> {
    pub fn value(&self) -> &T {
        match self {
            Lookup::Live(v) | Lookup::Unconfigured(v) => v,
            Lookup::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Lookup::Live(v) | Lookup::Unconfigured(v) => v,
            Lookup::Fallback { value, .. } => value,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Lookup::Live(_))
    }

    pub fn fallback_cause(&self) -> Option<&str> {
        match self {
            Lookup::Fallback { cause, .. } => Some(cause),
            _ => None,
        }
    }

    pub fn source(&self) -> DataSource {
        match self {
            Lookup::Live(_) => DataSource::Live,
            Lookup::Unconfigured(_) => DataSource::Unconfigured,
            Lookup::Fallback { .. } => DataSource::Fallback,
        }
    }
}
