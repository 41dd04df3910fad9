use thiserror::Error;

/// Errors visible to callers of [`crate::SuggestService`].
///
/// Upstream failures are not represented here; lookups absorb them into
/// fallback data.
#[derive(Debug, Error)]
pub enum SuggestError {
    #[error("Invalid coordinates (lat={lat}, lng={lng}): latitude must be within [-90, 90] and longitude within [-180, 180]")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SuggestError {
    /// True for errors caused by the request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SuggestError::InvalidCoordinates { .. })
    }
}

impl From<anyhow::Error> for SuggestError {
    fn from(err: anyhow::Error) -> Self {
        SuggestError::Config(format!("{err:#}"))
    }
}
