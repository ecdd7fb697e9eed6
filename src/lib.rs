pub mod api;
pub mod config;
pub mod core;
pub mod ingest;
pub mod providers;
pub mod store;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::api::AppState;
use crate::config::AppConfig;
use crate::core::currency::{CurrencyRateProvider, RatePolicy};
use crate::providers::UnconfiguredRateSource;
use crate::providers::caching::CachingRateProvider;
use crate::providers::exchange_rate_api::ExchangeRateApiProvider;
use crate::store::disk::DiskStore;

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    match config_path {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load(),
    }
}

fn build_rate_provider(config: &AppConfig) -> Arc<dyn CurrencyRateProvider> {
    let Some(provider_config) = config.providers.exchange_rate.as_ref() else {
        warn!("No exchange-rate provider configured, every analysis will use the fallback rate");
        return Arc::new(UnconfiguredRateSource);
    };

    match config.exchange_rate_api_key() {
        Some(api_key) => Arc::new(CachingRateProvider::new(
            ExchangeRateApiProvider::new(&provider_config.base_url, &api_key),
            Duration::from_secs(config.rates.cache_ttl_secs),
        )),
        None => {
            warn!(
                "EXCHANGE_RATE_API_KEY not set and no api_key in config, \
                 every analysis will use the fallback rate"
            );
            Arc::new(UnconfiguredRateSource)
        }
    }
}

/// Run the comparison API server until it is shut down.
pub async fn run_serve(config_path: Option<&str>) -> Result<()> {
    info!("remitscan API starting...");

    let config = load_config(config_path)?;

    let data_path = config.default_data_path()?;
    let store = Arc::new(DiskStore::open(&data_path)?);
    info!("Opened corridor store at {}", data_path.display());

    let state = AppState {
        corridors: store.clone(),
        history: store,
        rates: build_rate_provider(&config),
        rate_policy: RatePolicy {
            fallback_rate: config.rates.fallback_rate,
            timeout: Duration::from_secs(config.rates.timeout_secs),
        },
    };

    let app = api::app(state, &config.server.cors_origins);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!("Listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Ingest a Remittance Prices Worldwide CSV export into the store,
/// replacing any previously loaded dataset.
pub async fn run_load(config_path: Option<&str>, csv_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    let dataset = ingest::load_dataset_from_path(csv_path)
        .with_context(|| format!("Failed to ingest {}", csv_path.display()))?;
    info!(
        corridors = dataset.corridors.len(),
        mappings = dataset.mappings.len(),
        "Dataset parsed"
    );

    let data_path = config.default_data_path()?;
    let store = DiskStore::open(&data_path)?;
    use crate::store::CorridorStore;
    store
        .replace_all(dataset.corridors, dataset.mappings)
        .await?;
    info!("Corridor store updated at {}", data_path.display());
    Ok(())
}
