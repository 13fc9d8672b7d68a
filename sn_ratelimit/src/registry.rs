use std::sync::Arc;

use dashmap::DashMap;
use sn_config::LimitSummary;

use crate::error::Result;
use crate::limiter::RateLimiter;
use crate::token_bucket::RateLimitSpec;
use crate::token_bucket::TokenBucket;

/// Rate given to a key that is used before any limit was set for it (tokens per second)
pub const FALLBACK_RATE: f64 = 0.5;

/// Burst given to a key that is used before any limit was set for it
pub const FALLBACK_BURST: u32 = 1;

/// Rate used by [`LimiterRegistry::set_limit_from_summary`] when the summary has nothing for a key
pub const DEFAULT_SUMMARY_RATE: f64 = 1.0;

/// Independent token buckets keyed by logical endpoint, e.g. `binance.futures`
///
/// A registry is an ordinary owned value: build one per process or config scope and share it by
/// reference or `Arc`. Keys that were never configured are throttled to
/// [`FALLBACK_RATE`]/[`FALLBACK_BURST`] on first use rather than rejected or left unlimited.
#[derive(Default)]
pub struct LimiterRegistry {
    buckets: DashMap<String, Arc<TokenBucket>>,
}

impl LimiterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the bucket for `key`
    ///
    /// The new bucket starts full; tokens from a replaced bucket are not carried over.
    pub fn set_limit(&self, key: &str, rate: f64, burst: Option<u32>) -> RateLimitSpec {
        let spec = RateLimitSpec::new(rate, burst);
        let replaced = self.buckets.insert(key.to_string(), Arc::new(TokenBucket::new(spec))).is_some();

        tracing::info!("Rate limit {} for {key}: {:.4} req/s, burst {}", if replaced { "replaced" } else { "set" }, spec.rate(), spec.burst());
        spec
    }

    /// Bucket for `key`, registering the fallback bucket if the key is unknown
    ///
    /// Check-and-insert is atomic per key, so concurrent first calls share one bucket.
    pub fn bucket(&self, key: &str) -> Arc<TokenBucket> {
        if let Some(bucket) = self.buckets.get(key) {
            return Arc::clone(bucket.value());
        }

        self.buckets
            .entry(key.to_string())
            .or_insert_with(|| {
                tracing::warn!("No rate limit configured for {key}, using fallback of {FALLBACK_RATE} req/s, burst {FALLBACK_BURST}");
                Arc::new(TokenBucket::new(RateLimitSpec::new(FALLBACK_RATE, Some(FALLBACK_BURST))))
            })
            .clone()
    }

    /// Block until `cost` tokens are available for `key`, then take them
    pub fn call(&self, key: &str, cost: f64) -> Result<()> {
        self.bucket(key).acquire_blocking(cost)
    }

    pub fn call_one(&self, key: &str) -> Result<()> {
        self.call(key, 1.0)
    }

    /// Async form of [`LimiterRegistry::call`]; cancelling it never deducts tokens
    pub async fn call_async(&self, key: &str, cost: f64) -> Result<()> {
        let bucket = self.bucket(key);
        bucket.acquire(cost).await
    }

    /// Take `cost` tokens for `key` only if they are available right now
    pub fn try_call(&self, key: &str, cost: f64) -> Result<()> {
        self.bucket(key).try_acquire(cost)
    }

    /// Configure `key` from a normalised summary
    ///
    /// The dotted key is looked up in the summary (`binance.futures` reads
    /// `summary["binance"]["futures"]`). The rate is the endpoint's `rps`, else its `rpm / 60`, else
    /// `default_rate`. Missing providers or classes are not an error.
    pub fn set_limit_from_summary(&self, key: &str, summary: &LimitSummary, default_rate: f64, burst: Option<u32>) -> RateLimitSpec {
        let rate = summary.lookup(key).and_then(|endpoint| endpoint.rps.or_else(|| endpoint.rpm.map(|rpm| rpm / 60.0)));

        match rate {
            Some(rate) => self.set_limit(key, rate, burst),
            None => {
                tracing::debug!("No quota for {key} in summary, using default {default_rate} req/s");
                self.set_limit(key, default_rate, burst)
            }
        }
    }

    /// Configure several keys from one summary, with [`DEFAULT_SUMMARY_RATE`] for missing quotas
    pub fn configure_from_summary(&self, summary: &LimitSummary, keys: &[(&str, Option<u32>)]) {
        for (key, burst) in keys {
            self.set_limit_from_summary(key, summary, DEFAULT_SUMMARY_RATE, *burst);
        }
    }

    pub fn spec(&self, key: &str) -> Option<RateLimitSpec> {
        self.buckets.get(key).map(|bucket| bucket.spec())
    }

    /// Tokens currently available for `key`, without registering it
    pub fn available(&self, key: &str) -> Option<f64> {
        let bucket = self.buckets.get(key).map(|bucket| Arc::clone(bucket.value()))?;
        Some(bucket.available())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.buckets.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.buckets.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sn_config::Endpoint;
    use sn_config::ProviderSummary;
    use tokio::time::Instant;

    use super::*;
    use crate::error::RateLimitError;
    use crate::token_bucket::MIN_RATE;

    fn summary() -> LimitSummary {
        let mut summary = LimitSummary::new();
        summary.insert("fred", ProviderSummary::Flat(Endpoint { rpm: Some(30.0), ..Default::default() }));
        summary.insert(
            "binance",
            ProviderSummary::Grouped(
                [("spot".to_string(), Endpoint::from_rpm(Some(1200.0))), ("futures".to_string(), Endpoint::from_rpm(Some(2400.0)))]
                    .into_iter()
                    .collect(),
            ),
        );
        summary.insert("telegram", ProviderSummary::Flat(Endpoint::default().with_extra("global_rps", 30.0)));
        summary
    }

    #[test]
    fn test_set_limit() {
        let registry = LimiterRegistry::new();
        let spec = registry.set_limit("binance.futures", 40.0, Some(40));

        assert_eq!(spec.rate(), 40.0);
        assert_eq!(spec.burst(), 40);
        assert_eq!(registry.spec("binance.futures"), Some(spec));
        assert_eq!(registry.available("binance.futures"), Some(40.0));
    }

    #[test]
    fn test_replace_discards_tokens() {
        let registry = LimiterRegistry::new();
        registry.set_limit("fred", 0.1, Some(5));
        registry.try_call("fred", 5.0).unwrap();

        registry.set_limit("fred", 0.2, Some(3));
        assert_eq!(registry.available("fred"), Some(3.0));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unconfigured_key_uses_fallback() {
        let registry = LimiterRegistry::new();
        assert!(!registry.contains("unconfigured.key"));

        registry.call_one("unconfigured.key").unwrap();

        let spec = registry.spec("unconfigured.key").unwrap();
        assert_eq!(spec.rate(), FALLBACK_RATE);
        assert_eq!(spec.burst(), FALLBACK_BURST);
        assert!(matches!(registry.try_call("unconfigured.key", 1.0), Err(RateLimitError::Exceeded { .. })));
    }

    #[test]
    fn test_available_does_not_register() {
        let registry = LimiterRegistry::new();
        assert_eq!(registry.available("nothing"), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_from_summary_rpm_only() {
        let registry = LimiterRegistry::new();
        let spec = registry.set_limit_from_summary("fred", &summary(), DEFAULT_SUMMARY_RATE, None);

        assert!((spec.rate() - 0.5).abs() < 1e-12);
        assert_eq!(spec.burst(), 1);
    }

    #[test]
    fn test_from_summary_prefers_rps() {
        let registry = LimiterRegistry::new();
        let spec = registry.set_limit_from_summary("binance.futures", &summary(), DEFAULT_SUMMARY_RATE, Some(40));

        assert_eq!(spec.rate(), 40.0);
        assert_eq!(spec.burst(), 40);
    }

    #[test]
    fn test_from_summary_missing_path_uses_default() {
        let registry = LimiterRegistry::new();

        assert_eq!(registry.set_limit_from_summary("coinbase.spot", &summary(), 2.0, None).rate(), 2.0);
        assert_eq!(registry.set_limit_from_summary("binance.options", &summary(), 3.0, None).rate(), 3.0);
        assert_eq!(registry.set_limit_from_summary("telegram", &summary(), 1.0, Some(2)).rate(), 1.0);
    }

    #[test]
    fn test_from_summary_zero_quota_is_clamped() {
        let mut summary = LimitSummary::new();
        summary.insert("dead", ProviderSummary::Flat(Endpoint::from_rpm(Some(0.0))));

        let registry = LimiterRegistry::new();
        assert_eq!(registry.set_limit_from_summary("dead", &summary, 1.0, None).rate(), MIN_RATE);
    }

    #[test]
    fn test_configure_from_summary() {
        let registry = LimiterRegistry::new();
        registry.configure_from_summary(&summary(), &[("binance.spot", Some(20)), ("binance.futures", Some(40)), ("fred", Some(2))]);

        assert_eq!(registry.keys(), ["binance.futures", "binance.spot", "fred"]);
        assert_eq!(registry.spec("binance.spot").unwrap().burst(), 20);
        assert_eq!(registry.spec("binance.spot").unwrap().rate(), 20.0);
    }

    #[test]
    fn test_concurrent_first_use_shares_one_bucket() {
        let registry = Arc::new(LimiterRegistry::new());
        let mut handles = vec![];

        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || registry.try_call("race.key", 1.0).is_ok()));
        }

        let admitted = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();

        // One fallback bucket with a single token: exactly one caller gets through
        assert_eq!(admitted, 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_paces_at_half_per_second() {
        let registry = LimiterRegistry::new();
        let start = Instant::now();

        registry.call_async("unconfigured.key", 1.0).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);

        registry.call_async("unconfigured.key", 1.0).await.unwrap();
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(2), "waited {waited:?}");
        assert!(waited < Duration::from_millis(2100), "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let registry = LimiterRegistry::new();
        registry.set_limit("a", 1.0, Some(1));
        registry.set_limit("b", 1.0, Some(1));
        let start = Instant::now();

        registry.call_async("a", 1.0).await.unwrap();
        registry.call_async("b", 1.0).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
