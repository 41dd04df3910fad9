use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::model::{Lookup, WeatherInfo};

use super::{WeatherLookup, truncate_body};

const OPENWEATHER_BASE: &str = "https://api.openweathermap.org";
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// Weather returned when no API key is configured.
pub fn unconfigured_weather() -> WeatherInfo {
    WeatherInfo::new("Clear", "clear sky", 25.0)
}

/// Weather returned when the OpenWeather call fails.
pub fn fallback_weather() -> WeatherInfo {
    WeatherInfo::new("Fine (Mock)", "sunny (mock data due to api error)", 22.0)
}

#[derive(Clone)]
pub struct OpenWeatherLookup {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for OpenWeatherLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherLookup")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenWeatherLookup {
    pub fn new(api_key: Option<String>, http: Client) -> Self {
        Self {
            api_key,
            base_url: OPENWEATHER_BASE.to_string(),
            http,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn fetch_current(&self, api_key: &str, lat: f64, lng: f64) -> Result<WeatherInfo> {
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);
        let lat = format!("{lat:.6}");
        let lon = format!("{lng:.6}");

        debug!(%url, %lat, %lon, "Requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", api_key),
                ("units", "metric"),
            ])
            .send()
            .await
            // The query string carries the API key.
            .map_err(reqwest::Error::without_url)
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        let condition = parsed
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenWeather current response contained no weather entries"))?;

        Ok(WeatherInfo {
            main: condition.main,
            description: condition.description,
            temperature: parsed.main.temp,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[async_trait]
impl WeatherLookup for OpenWeatherLookup {
    #[instrument(skip(self), level = "info")]
    async fn current_weather(&self, lat: f64, lng: f64) -> Lookup<WeatherInfo> {
        let Some(api_key) = self.api_key.as_deref() else {
            debug!("No OpenWeather API key configured, using mock weather");
            return Lookup::Unconfigured(unconfigured_weather());
        };

        match self.fetch_current(api_key, lat, lng).await {
            Ok(weather) => Lookup::Live(weather),
            Err(err) => {
                let cause = format!("{err:#}");
                warn!(%cause, "Weather lookup failed, using mock data");
                Lookup::Fallback { value: fallback_weather(), cause }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataSource;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lookup(server: &MockServer, api_key: Option<&str>) -> OpenWeatherLookup {
        OpenWeatherLookup::new(api_key.map(str::to_owned), Client::new())
            .with_base_url(&server.uri())
    }

    #[tokio::test]
    async fn parses_first_weather_entry() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(CURRENT_WEATHER_PATH))
            .and(query_param("lat", "35.681236"))
            .and(query_param("lon", "139.767125"))
            .and(query_param("appid", "test_key"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Tokyo",
                "main": {"temp": 18.4, "humidity": 70},
                "weather": [
                    {"id": 500, "main": "Rain", "description": "light rain"},
                    {"id": 701, "main": "Mist", "description": "mist"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = lookup(&server, Some("test_key"))
            .current_weather(35.681236, 139.767125)
            .await;

        assert!(result.is_live());
        assert_eq!(result.into_value(), WeatherInfo::new("Rain", "light rain", 18.4));
    }

    #[tokio::test]
    async fn missing_key_returns_clear_sky_without_network() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = lookup(&server, None).current_weather(1.0, 2.0).await;

        assert_eq!(result, Lookup::Unconfigured(WeatherInfo::new("Clear", "clear sky", 25.0)));
    }

    #[tokio::test]
    async fn error_status_falls_back() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(CURRENT_WEATHER_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"cod":401}"#))
            .mount(&server)
            .await;

        let result = lookup(&server, Some("bad_key")).current_weather(1.0, 2.0).await;

        assert_eq!(*result.value(), fallback_weather());
        let cause = result.fallback_cause().expect("fallback cause");
        assert!(cause.contains("401"));
    }

    #[tokio::test]
    async fn malformed_json_falls_back() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(CURRENT_WEATHER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = lookup(&server, Some("k")).current_weather(1.0, 2.0).await;

        assert_eq!(*result.value(), fallback_weather());
        assert!(result.fallback_cause().unwrap().contains("Failed to parse"));
    }

    #[tokio::test]
    async fn empty_weather_list_falls_back() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(CURRENT_WEATHER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main": {"temp": 10.0},
                "weather": []
            })))
            .mount(&server)
            .await;

        let result = lookup(&server, Some("k")).current_weather(1.0, 2.0).await;

        assert_eq!(*result.value(), fallback_weather());
        assert!(result.fallback_cause().unwrap().contains("no weather entries"));
    }

    #[tokio::test]
    async fn unreachable_host_falls_back() {
        // Nothing listens on port 9 on the loopback interface.
        let result = OpenWeatherLookup::new(Some("k".to_string()), Client::new())
            .with_base_url("http://127.0.0.1:9")
            .current_weather(1.0, 2.0)
            .await;

        assert_eq!(*result.value(), fallback_weather());
        assert!(!result.is_live());
    }

    #[tokio::test]
    async fn slow_upstream_times_out_into_fallback() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(CURRENT_WEATHER_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({
                        "main": {"temp": 10.0},
                        "weather": [{"main": "Clear", "description": "clear sky"}]
                    }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let http = Client::builder().timeout(Duration::from_millis(200)).build().unwrap();
        let result = OpenWeatherLookup::new(Some("k".to_string()), http)
            .with_base_url(&server.uri())
            .current_weather(1.0, 2.0)
            .await;

        assert_eq!(result.source(), DataSource::Fallback);
        assert_eq!(*result.value(), fallback_weather());
    }
}
