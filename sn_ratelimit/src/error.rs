use std::time::Duration;

use thiserror::Error;

/// Result type for rate limiting operations
pub type Result<T> = std::result::Result<T, RateLimitError>;

/// Errors that can occur during rate limiting operations
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum RateLimitError {
    /// Not enough tokens right now; enough will have accumulated after `retry_after`
    #[error("Rate limit exceeded, retry after {retry_after:?}")]
    Exceeded { retry_after: Duration },

    /// Cost is negative, NaN or infinite
    #[error("Invalid cost {0}: must be finite and >= 0")]
    InvalidCost(f64),

    /// Cost larger than the bucket can ever hold
    #[error("Cost {cost} exceeds bucket burst {burst}")]
    CostExceedsBurst { cost: f64, burst: u32 },
}
