use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::currency::CurrencyRateProvider;

/// exchangerate-api.com v6 pair-conversion client.
///
/// `GET {base_url}/v6/{api_key}/pair/{FROM}/{TO}` returns the mid-market
/// conversion rate used as the reference against which each provider's
/// margin is measured.
pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: String,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct PairConversionResponse {
    result: String,
    conversion_rate: Option<f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

#[async_trait]
impl CurrencyRateProvider for ExchangeRateApiProvider {
    #[instrument(
        name = "ExchangeRateFetch",
        skip(self),
        fields(from = %from, to = %to)
    )]
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        let url = format!("{}/v6/{}/pair/{}/{}", self.base_url, self.api_key, from, to);
        debug!("Requesting conversion rate from {}/v6/<key>/pair/{}/{}", self.base_url, from, to);

        let client = reqwest::Client::builder().user_agent("remitscan/1.0").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for pair {}/{}", e, from, to))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for pair {}/{}",
                response.status(),
                from,
                to
            ));
        }

        let data = response
            .json::<PairConversionResponse>()
            .await
            .map_err(|e| anyhow!("Failed to parse rate response for {}/{}: {}", from, to, e))?;

        if data.result != "success" {
            return Err(anyhow!(
                "Rate API error for pair {}/{}: {}",
                from,
                to,
                data.error_type.unwrap_or_else(|| data.result.clone())
            ));
        }

        data.conversion_rate
            .filter(|rate| *rate > 0.0)
            .ok_or_else(|| anyhow!("No conversion rate found for pair {}/{}", from, to))
    }
}
