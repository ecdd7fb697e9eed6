use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::currency::CurrencyRateProvider;

struct CachedRate {
    rate: f64,
    fetched_at: Instant,
}

/// TTL cache over any rate provider. Rates move slowly relative to
/// request volume, so a short TTL keeps the upstream call volume down
/// without serving stale quotes. Errors are not cached; a failed
/// lookup retries on the next request.
pub struct CachingRateProvider<T: CurrencyRateProvider> {
    inner: T,
    ttl: Duration,
    cache: Arc<Mutex<HashMap<String, CachedRate>>>,
}

impl<T: CurrencyRateProvider> CachingRateProvider<T> {
    pub fn new(inner: T, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl<T: CurrencyRateProvider + Send + Sync> CurrencyRateProvider for CachingRateProvider<T> {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        let key = format!("{from}-{to}");

        let mut cache = self.cache.lock().await;
        if let Some(entry) = cache.get(&key) {
            if entry.fetched_at.elapsed() < self.ttl {
                debug!("Cache hit for currency rate: {}", key);
                return Ok(entry.rate);
            }
            debug!("Cache entry expired for currency rate: {}", key);
        } else {
            debug!("Cache miss for currency rate: {}", key);
        }

        let rate = self.inner.get_rate(from, to).await?;
        cache.insert(
            key,
            CachedRate {
                rate,
                fetched_at: Instant::now(),
            },
        );
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingProvider {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl CurrencyRateProvider for CountingProvider {
        async fn get_rate(&self, _from: &str, _to: &str) -> Result<f64> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(anyhow!("boom"))
            } else {
                Ok(80.0 + n as f64)
            }
        }
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_cache() {
        let provider = CachingRateProvider::new(
            CountingProvider::new(false),
            Duration::from_secs(300),
        );

        assert_eq!(provider.get_rate("USD", "INR").await.unwrap(), 80.0);
        assert_eq!(provider.get_rate("USD", "INR").await.unwrap(), 80.0);
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_pairs_are_cached_separately() {
        let provider = CachingRateProvider::new(
            CountingProvider::new(false),
            Duration::from_secs(300),
        );

        assert_eq!(provider.get_rate("USD", "INR").await.unwrap(), 80.0);
        assert_eq!(provider.get_rate("USD", "PHP").await.unwrap(), 81.0);
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_entry_refetches() {
        let provider =
            CachingRateProvider::new(CountingProvider::new(false), Duration::from_millis(10));

        assert_eq!(provider.get_rate("USD", "INR").await.unwrap(), 80.0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(provider.get_rate("USD", "INR").await.unwrap(), 81.0);
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let provider = CachingRateProvider::new(
            CountingProvider::new(true),
            Duration::from_secs(300),
        );

        assert!(provider.get_rate("USD", "INR").await.is_err());
        assert!(provider.get_rate("USD", "INR").await.is_err());
        assert_eq!(provider.inner.calls.load(Ordering::SeqCst), 2);
    }
}
