pub mod error;
pub mod limiter;
pub mod registry;
pub mod token_bucket;
mod time;

pub use error::RateLimitError;
pub use error::Result;
pub use limiter::RateLimiter;
pub use registry::FALLBACK_BURST;
pub use registry::FALLBACK_RATE;
pub use registry::LimiterRegistry;
pub use token_bucket::MIN_RATE;
pub use token_bucket::RateLimitSpec;
pub use token_bucket::TokenBucket;
