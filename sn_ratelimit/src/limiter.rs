use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

/// Core trait for all rate limiting implementations
///
/// Costs are fractional so one logical call can consume a weighted share of quota.
pub trait RateLimiter: Send + Sync {
    /// Try to acquire `cost` tokens without blocking
    fn try_acquire(&self, cost: f64) -> Result<()>;

    /// Try to acquire a single token without blocking
    fn try_acquire_one(&self) -> Result<()> {
        self.try_acquire(1.0)
    }

    /// Asynchronously wait until tokens become available, then acquire them
    ///
    /// Dropping the future while it waits leaves the limiter untouched.
    fn acquire(&self, cost: f64) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Asynchronously acquire a single token
    fn acquire_one(&self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.acquire(1.0)
    }

    /// Block the calling thread until tokens become available, then acquire them
    fn acquire_blocking(&self, cost: f64) -> Result<()>;

    /// Get the number of currently available tokens
    fn available(&self) -> f64;

    /// Get the maximum capacity (burst)
    fn capacity(&self) -> u32;

    /// Reset the rate limiter to initial state
    fn reset(&self);
}
