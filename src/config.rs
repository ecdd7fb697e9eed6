use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: default_bind_addr(),
            cors_origins: default_cors_origins(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExchangeRateProviderConfig {
    pub base_url: String,
    /// Falls back to the EXCHANGE_RATE_API_KEY env var when unset.
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub exchange_rate: Option<ExchangeRateProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            exchange_rate: Some(ExchangeRateProviderConfig {
                base_url: "https://v6.exchangerate-api.com".to_string(),
                api_key: None,
            }),
        }
    }
}

fn default_fallback_rate() -> f64 {
    83.0
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_cache_ttl_secs() -> u64 {
    300
}

/// Degradation behavior when the live-rate lookup is slow or down.
/// The fallback is a deliberate configuration choice, not a buried
/// constant; the shipped default matches the USD→INR ballpark the
/// original dataset centers on.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RatesConfig {
    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        RatesConfig {
            fallback_rate: default_fallback_rate(),
            timeout_secs: default_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub rates: RatesConfig,
    /// Where the corridor store lives. None falls back to the
    /// platform data directory, so `load` and `serve` share a store
    /// without any configuration.
    pub data_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "remitscan", "remitscan")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "remitscan", "remitscan")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// The exchange-rate API key, from config or the environment.
    pub fn exchange_rate_api_key(&self) -> Option<String> {
        self.providers
            .exchange_rate
            .as_ref()
            .and_then(|p| p.api_key.clone())
            .or_else(|| std::env::var("EXCHANGE_RATE_API_KEY").ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
server:
  bind_addr: "0.0.0.0:9000"
  cors_origins:
    - "http://localhost:3000"
    - "https://remitscan.example"
providers:
  exchange_rate:
    base_url: "https://v6.exchangerate-api.com"
    api_key: "live-key"
rates:
  fallback_rate: 74.5
  timeout_secs: 2
data_path: "/var/lib/remitscan"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();

        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.server.cors_origins.len(), 2);
        assert_eq!(config.rates.fallback_rate, 74.5);
        assert_eq!(config.rates.timeout_secs, 2);
        // unset fields keep their defaults
        assert_eq!(config.rates.cache_ttl_secs, 300);
        assert_eq!(config.data_path.as_deref(), Some("/var/lib/remitscan"));

        let provider = config.providers.exchange_rate.as_ref().unwrap();
        assert_eq!(provider.api_key.as_deref(), Some("live-key"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();

        assert_eq!(config.server.bind_addr, "127.0.0.1:8000");
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.rates.fallback_rate, 83.0);
        assert_eq!(config.rates.timeout_secs, 5);
        assert!(config.data_path.is_none());

        let provider = config.providers.exchange_rate.as_ref().unwrap();
        assert_eq!(provider.base_url, "https://v6.exchangerate-api.com");
    }

    #[test]
    fn test_data_path_resolution() {
        let config: AppConfig = serde_yaml::from_str("data_path: \"/var/lib/remitscan\"").unwrap();
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/var/lib/remitscan")
        );

        // unset data_path resolves to the platform data directory
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        let resolved = config.default_data_path().unwrap();
        assert!(resolved.to_string_lossy().contains("remitscan"));
    }

    #[test]
    fn test_load_from_missing_path_fails_with_context() {
        let result = AppConfig::load_from_path("/definitely/not/here.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
