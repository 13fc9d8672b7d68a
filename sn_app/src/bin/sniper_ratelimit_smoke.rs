use std::time::Instant;

use sn_app::APP_NAME;
use sn_app::cli;
use sn_app::tracing_setup;
use sn_config::ConfigLoader;
use sn_ratelimit::LimiterRegistry;
use tracing::info;

/// Keys exercised by the smoke run, with the burst each one is given
const SMOKE_KEYS: [(&str, Option<u32>); 3] = [("binance.spot", Some(20)), ("binance.futures", Some(40)), ("fred", Some(2))];

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let loader = ConfigLoader::new(cli::config_dir());
    let system = loader.load_system()?;
    let _guard = tracing_setup::init(APP_NAME, &system.logging);

    let summary = loader.load_limit_summary()?;
    let registry = LimiterRegistry::new();
    registry.configure_from_summary(&summary, &SMOKE_KEYS);

    let start = Instant::now();

    for _ in 0..5 {
        registry.call("binance.spot", 1.0)?;
    }
    // Futures endpoints weigh 5 each
    for _ in 0..3 {
        registry.call("binance.futures", 5.0)?;
    }
    for _ in 0..3 {
        registry.call("fred", 1.0)?;
    }

    let elapsed = start.elapsed();
    for key in registry.keys() {
        info!("{key}: {:.2} tokens left", registry.available(&key).unwrap_or_default());
    }
    info!("RateLimiter smoke OK in {:.2}s", elapsed.as_secs_f64());
    println!("RateLimiter smoke OK in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}
