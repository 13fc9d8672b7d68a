//! # sn_app
//!
//! Boot, health and smoke-test entry points for the sniper tooling

pub mod cli;
pub mod health;
pub mod tracing_setup;

/// Name used for log files and the boot banner
pub const APP_NAME: &str = "sniper";
