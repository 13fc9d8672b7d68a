//! # sn_config
//!
//! Typed configuration for the sniper tooling: risk and system settings, per-provider API
//! quotas, and the normalised limit summary the rate limiter is configured from.

pub mod error;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod summary;

pub use error::ConfigError;
pub use error::Result;
pub use loader::ConfigLoader;
pub use loader::Settings;
pub use models::ApiLimits;
pub use models::LoggingConfig;
pub use models::Mode;
pub use models::RiskConfig;
pub use models::SystemConfig;
pub use normalize::per_15min_to_rpm;
pub use normalize::rpm_to_rps;
pub use summary::Endpoint;
pub use summary::LimitSummary;
pub use summary::ProviderSummary;
pub use summary::summarize_limits;
