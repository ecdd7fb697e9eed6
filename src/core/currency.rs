//! Live exchange-rate abstractions.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64>;
}

/// How the request path degrades when the rate source is slow or down.
#[derive(Debug, Clone, Copy)]
pub struct RatePolicy {
    /// Substituted when the lookup fails or times out. The engine has
    /// no concept of live vs fallback, so this flows through untouched.
    pub fallback_rate: f64,
    pub timeout: Duration,
}

impl Default for RatePolicy {
    fn default() -> Self {
        RatePolicy {
            fallback_rate: 83.0,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Fetch the live rate with a bounded timeout, substituting the
/// configured fallback on any failure. Always returns a usable rate;
/// rejects non-positive values from misbehaving sources since the cost
/// formulas require a positive rate.
pub async fn resolve_rate(
    provider: &dyn CurrencyRateProvider,
    from: &str,
    to: &str,
    policy: RatePolicy,
) -> f64 {
    match tokio::time::timeout(policy.timeout, provider.get_rate(from, to)).await {
        Ok(Ok(rate)) if rate > 0.0 => rate,
        Ok(Ok(rate)) => {
            warn!(%from, %to, rate, "Rate source returned a non-positive rate, using fallback");
            policy.fallback_rate
        }
        Ok(Err(e)) => {
            warn!(%from, %to, error = %e, "Rate lookup failed, using fallback");
            policy.fallback_rate
        }
        Err(_) => {
            warn!(%from, %to, timeout = ?policy.timeout, "Rate lookup timed out, using fallback");
            policy.fallback_rate
        }
    }
}
