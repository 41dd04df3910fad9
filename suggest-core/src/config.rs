use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::provider::ProviderId;

/// Configuration for a single provider (API key, optional endpoint override).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,

    /// Scheme and host of the provider API. Defaults to the public endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Settings shared by every outbound call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs() }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub http: HttpConfig,
}

/// Environment variables that override the stored API keys.
const ENV_API_KEYS: &[(ProviderId, &str)] = &[
    (ProviderId::OpenWeather, "OPENWEATHER_API_KEY"),
    (ProviderId::GooglePlaces, "GOOGLE_MAPS_API_KEY"),
];

impl Config {
    /// Load config from disk and apply environment overrides.
    ///
    /// A missing config file is not an error: both providers then run on mock
    /// data unless a key is supplied through the environment.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from_path(&path)?;
        cfg.apply_env_overrides_with(|name| std::env::var(name).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load config from an explicit path, or return an empty default if it doesn't exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to_path(&path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "spot-suggest", "suggest")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Replace API keys with non-blank values from `lookup` (normally the process environment).
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for &(id, var) in ENV_API_KEYS {
            if let Some(key) = lookup(var).filter(|k| !k.trim().is_empty()) {
                self.upsert_provider_api_key(id, key);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=300).contains(&self.http.timeout_secs) {
            return Err(anyhow!(
                "Invalid http.timeout_secs = {}: must be between 1 and 300 seconds",
                self.http.timeout_secs
            ));
        }

        for (name, provider) in &self.providers {
            if let Some(url) = &provider.base_url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(anyhow!(
                        "Invalid base_url for provider '{name}': must be an http or https URL"
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Set or replace a provider API key, keeping any endpoint override.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers
            .entry(provider_id.as_str().to_string())
            .or_default()
            .api_key = api_key;
    }

    /// Returns API key for a provider, if present. Blank keys count as absent.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)
            .map(|cfg| cfg.api_key.trim())
            .filter(|key| !key.is_empty())
    }

    pub fn provider_base_url(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)
            .and_then(|cfg| cfg.base_url.as_deref())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderId;

    #[test]
    fn empty_config_has_no_keys() {
        let cfg = Config::default();

        for id in ProviderId::all() {
            assert!(!cfg.is_provider_configured(*id));
        }
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn set_api_key_for_provider() {
        let mut cfg = Config::default();

        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "OPEN_KEY".into());

        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("OPEN_KEY"));
        assert!(cfg.is_provider_configured(ProviderId::OpenWeather));
        assert!(!cfg.is_provider_configured(ProviderId::GooglePlaces));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::GooglePlaces, "   ".into());

        assert_eq!(cfg.provider_api_key(ProviderId::GooglePlaces), None);
    }

    #[test]
    fn upsert_keeps_base_url() {
        let mut cfg = Config::default();
        cfg.providers.insert(
            "openweather".into(),
            ProviderConfig { api_key: "OLD".into(), base_url: Some("http://localhost:9000".into()) },
        );

        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "NEW".into());

        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("NEW"));
        assert_eq!(cfg.provider_base_url(ProviderId::OpenWeather), Some("http://localhost:9000"));
    }

    #[test]
    fn env_overrides_replace_file_keys() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "FROM_FILE".into());

        cfg.apply_env_overrides_with(|name| match name {
            "OPENWEATHER_API_KEY" => Some("FROM_ENV".to_string()),
            "GOOGLE_MAPS_API_KEY" => Some("MAPS_ENV".to_string()),
            _ => None,
        });

        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("FROM_ENV"));
        assert_eq!(cfg.provider_api_key(ProviderId::GooglePlaces), Some("MAPS_ENV"));
    }

    #[test]
    fn env_overrides_leave_unset_keys_alone() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::OpenWeather, "FROM_FILE".into());

        cfg.apply_env_overrides_with(|_| None);

        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("FROM_FILE"));
        assert!(!cfg.providers.contains_key("googleplaces"));
    }

    #[test]
    fn blank_env_value_keeps_file_key() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::GooglePlaces, "FROM_FILE".into());

        cfg.apply_env_overrides_with(|name| {
            (name == "GOOGLE_MAPS_API_KEY").then(|| "  ".to_string())
        });

        assert_eq!(cfg.provider_api_key(ProviderId::GooglePlaces), Some("FROM_FILE"));
    }

    #[test]
    fn validate_rejects_out_of_range_timeout() {
        let mut cfg = Config::default();
        cfg.http.timeout_secs = 0;
        assert!(cfg.validate().is_err());

        cfg.http.timeout_secs = 301;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));

        cfg.http.timeout_secs = 30;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_http_base_url() {
        let mut cfg = Config::default();
        cfg.providers.insert(
            "googleplaces".into(),
            ProviderConfig { api_key: "K".into(), base_url: Some("ftp://example.com".into()) },
        );

        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("googleplaces"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from_path(&dir.path().join("absent.toml")).unwrap();

        assert!(cfg.providers.is_empty());
        assert_eq!(cfg.http.timeout_secs, 10);
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::GooglePlaces, "MAPS_KEY".into());
        cfg.http.timeout_secs = 4;
        cfg.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.provider_api_key(ProviderId::GooglePlaces), Some("MAPS_KEY"));
        assert_eq!(loaded.http.timeout_secs, 4);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[providers.openweather]\napi_key = \"abc\"\n").unwrap();

        let cfg = Config::load_from_path(&path).unwrap();
        assert_eq!(cfg.provider_api_key(ProviderId::OpenWeather), Some("abc"));
        assert_eq!(cfg.http.timeout_secs, 10);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "providers = 3").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
