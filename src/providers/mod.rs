pub mod caching;
pub mod exchange_rate_api;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::core::currency::CurrencyRateProvider;

/// Stand-in rate source for deployments without an API key. Every
/// lookup fails, so the request path always lands on the configured
/// fallback rate.
pub struct UnconfiguredRateSource;

#[async_trait]
impl CurrencyRateProvider for UnconfiguredRateSource {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        Err(anyhow!(
            "no exchange-rate API key configured, cannot fetch {}/{}",
            from,
            to
        ))
    }
}
