//! Heuristic ranking of spots against the current weather.

use crate::model::{CrowdLevel, Spot, WeatherInfo, WeatherSuitability};

/// Number of spots returned by [`rank`].
pub const TOP_N: usize = 3;

/// Place types treated as outdoor when scoring against rain.
pub const OUTDOOR_TYPES: &[&str] = &[
    "park",
    "amusement_park",
    "campground",
    "zoo",
    "stadium",
    "tourist_attraction",
    "natural_feature",
];

/// Ratings above this count are considered crowded.
const HIGH_CROWD_RATINGS: u32 = 2000;
/// Ratings at or below this count are considered quiet.
const LOW_CROWD_RATINGS: u32 = 500;

/// Per-component breakdown of a spot's score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotScore {
    pub base: f64,
    pub weather_adjustment: f64,
    pub crowd_adjustment: f64,
    pub weather_suitability: WeatherSuitability,
    pub crowd_level: CrowdLevel,
}

impl SpotScore {
    pub fn total(&self) -> f64 {
        self.base + self.weather_adjustment + self.crowd_adjustment
    }
}

pub fn is_outdoor(types: &[String]) -> bool {
    types.iter().any(|t| OUTDOOR_TYPES.contains(&t.as_str()))
}

/// Score a single spot for the given weather without modifying it.
pub fn score_spot(weather: &WeatherInfo, spot: &Spot) -> SpotScore {
    let base = spot.rating * 10.0;

    let (weather_adjustment, weather_suitability) =
        match (weather.is_raining(), is_outdoor(&spot.types)) {
            (true, false) => (20.0, WeatherSuitability::GoodIndoor),
            (true, true) => (-30.0, WeatherSuitability::BadOutdoor),
            (false, true) => (15.0, WeatherSuitability::GoodOutdoor),
            (false, false) => (0.0, WeatherSuitability::Neutral),
        };

    let (crowd_adjustment, crowd_level) = if spot.user_ratings_total > HIGH_CROWD_RATINGS {
        (-10.0, CrowdLevel::High)
    } else if spot.user_ratings_total > LOW_CROWD_RATINGS {
        (0.0, CrowdLevel::Medium)
    } else {
        (5.0, CrowdLevel::Low)
    };

    SpotScore {
        base,
        weather_adjustment,
        crowd_adjustment,
        weather_suitability,
        crowd_level,
    }
}

/// Score every spot and return the [`TOP_N`] best, highest score first.
///
/// Spots with equal scores keep their input order.
pub fn rank(weather: &WeatherInfo, mut spots: Vec<Spot>) -> Vec<Spot> {
    for spot in spots.iter_mut() {
        let scored = score_spot(weather, spot);
        spot.score = scored.total();
        spot.weather_suitability = Some(scored.weather_suitability);
        spot.crowd_level = Some(scored.crowd_level);
    }

    // `sort_by` is stable, so ties stay in input order.
    spots.sort_by(|a, b| b.score.total_cmp(&a.score));
    spots.truncate(TOP_N);
    spots
}
