use std::time::Duration;

use tokio::time::Instant;

/// Shortest sleep between two admission attempts
pub(crate) const MIN_SLEEP: Duration = Duration::from_millis(10);

/// Sleep used when the refill rate cannot produce a meaningful wait
pub(crate) const DEGENERATE_SLEEP: Duration = Duration::from_millis(50);

/// Monotonic now
///
/// Goes through tokio's clock so a paused test runtime drives refills; outside a paused runtime
/// this is `std::time::Instant::now()`.
#[inline(always)]
pub(crate) fn now() -> Instant {
    Instant::now()
}

/// Time needed to refill `missing` tokens at `rate` tokens per second, never below [`MIN_SLEEP`]
#[inline]
pub(crate) fn deficit_wait(missing: f64, rate: f64) -> Duration {
    let wait = if rate.is_finite() && rate > 0.0 {
        Duration::try_from_secs_f64(missing / rate).unwrap_or(DEGENERATE_SLEEP)
    } else {
        DEGENERATE_SLEEP
    };
    wait.max(MIN_SLEEP)
}
