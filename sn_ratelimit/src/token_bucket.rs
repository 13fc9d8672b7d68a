use std::future::Future;
use std::pin::Pin;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::RateLimitError;
use crate::error::Result;
use crate::limiter::RateLimiter;
use crate::time;

/// Floor applied to degenerate refill rates (tokens per second)
pub const MIN_RATE: f64 = 0.001;

/// Rate and burst of one bucket
///
/// Built through [`RateLimitSpec::new`], which clamps degenerate input instead of rejecting it:
/// the rate is at least [`MIN_RATE`] and the burst at least 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitSpec {
    rate: f64,
    burst: u32,
}

impl RateLimitSpec {
    /// Burst defaults to one second worth of tokens, `ceil(rate)`, and never drops below 1
    pub fn new(rate: f64, burst: Option<u32>) -> Self {
        let burst = burst.unwrap_or_else(|| default_burst(rate)).max(1);

        let rate = if rate.is_finite() && rate >= MIN_RATE {
            rate
        } else {
            tracing::warn!("Degenerate rate {rate} clamped to {MIN_RATE} tokens/s");
            MIN_RATE
        };

        Self { rate, burst }
    }

    /// Tokens added per second
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Maximum number of tokens the bucket holds
    pub fn burst(&self) -> u32 {
        self.burst
    }

    fn capacity(&self) -> f64 {
        self.burst as f64
    }
}

fn default_burst(rate: f64) -> u32 {
    if rate.is_finite() && rate > 1.0 {
        rate.ceil().min(u32::MAX as f64) as u32
    } else {
        1
    }
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl BucketState {
    fn full(spec: &RateLimitSpec) -> Self {
        Self { tokens: spec.capacity(), last_refill: time::now() }
    }

    /// Add the tokens accrued since the last refill, capped at the burst
    #[inline]
    fn refill(&mut self, spec: &RateLimitSpec, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        if elapsed.is_zero() {
            return;
        }

        self.tokens = (self.tokens + elapsed.as_secs_f64() * spec.rate).min(spec.capacity());
        self.last_refill = now;
    }
}

/// Token bucket rate limiter
///
/// Tokens accrue continuously at `rate` per second up to `burst`; every admission deducts its
/// cost. The bucket starts full. Refill and deduction happen under one short-lived lock, and
/// waiting always happens with the lock released, so a sleeping caller never holds back others.
///
/// Waiters are not queued: after each sleep they race for tokens again. A large cost can in
/// principle be starved by a stream of small ones.
pub struct TokenBucket {
    spec: RateLimitSpec,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    pub fn new(spec: RateLimitSpec) -> Self {
        Self { spec, state: Mutex::new(BucketState::full(&spec)) }
    }

    /// Shorthand for `TokenBucket::new(RateLimitSpec::new(rate, burst))`
    pub fn with_rate(rate: f64, burst: Option<u32>) -> Self {
        Self::new(RateLimitSpec::new(rate, burst))
    }

    pub fn spec(&self) -> RateLimitSpec {
        self.spec
    }

    fn check_cost(&self, cost: f64) -> Result<()> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(RateLimitError::InvalidCost(cost));
        }
        if cost > self.spec.capacity() {
            return Err(RateLimitError::CostExceedsBurst { cost, burst: self.spec.burst });
        }
        Ok(())
    }
}

impl RateLimiter for TokenBucket {
    #[inline]
    fn try_acquire(&self, cost: f64) -> Result<()> {
        self.check_cost(cost)?;
        if cost == 0.0 {
            return Ok(());
        }

        let mut state = self.state.lock();
        state.refill(&self.spec, time::now());

        if state.tokens >= cost {
            state.tokens -= cost;
            return Ok(());
        }

        let missing = cost - state.tokens;
        Err(RateLimitError::Exceeded { retry_after: time::deficit_wait(missing, self.spec.rate) })
    }

    fn acquire(&self, cost: f64) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            loop {
                match self.try_acquire(cost) {
                    Ok(()) => return Ok(()),
                    Err(RateLimitError::Exceeded { retry_after }) => {
                        tracing::debug!("Deferred cost {cost} for {retry_after:?}");
                        tokio::time::sleep(retry_after).await;
                    }
                    Err(err) => return Err(err),
                }
            }
        })
    }

    fn acquire_blocking(&self, cost: f64) -> Result<()> {
        loop {
            match self.try_acquire(cost) {
                Ok(()) => return Ok(()),
                Err(RateLimitError::Exceeded { retry_after }) => {
                    tracing::debug!("Deferred cost {cost} for {retry_after:?}");
                    std::thread::sleep(retry_after);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn available(&self) -> f64 {
        let mut state = self.state.lock();
        state.refill(&self.spec, time::now());
        state.tokens
    }

    fn capacity(&self) -> u32 {
        self.spec.burst
    }

    fn reset(&self) {
        *self.state.lock() = BucketState::full(&self.spec);
    }
}
