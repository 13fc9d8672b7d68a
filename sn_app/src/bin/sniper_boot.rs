use sn_app::APP_NAME;
use sn_app::cli;
use sn_app::tracing_setup;
use sn_config::ConfigLoader;
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let loader = ConfigLoader::new(cli::config_dir());

    // Logging settings live in system.yml, so it is read before tracing exists
    let system = loader.load_system()?;
    let _guard = tracing_setup::init(APP_NAME, &system.logging);
    info!("boot: starting SNIPER from {}", loader.config_dir().display());

    let settings = loader.load_all()?;
    let summary = settings.limit_summary();

    info!("system: mode={}, log_dir={}, log_level={}", settings.system.mode, settings.system.logging.dir, settings.system.logging.level);
    info!(
        "risk: dd={}%, r/trade={}%, targetRR={}",
        settings.risk.max_daily_dd_pct, settings.risk.max_trade_r_pct, settings.risk.target_rr
    );
    info!("api_limits: {}", summary.to_json()?);

    println!("SNIPER boot OK. See {}/ and console.", settings.system.logging.dir);
    Ok(())
}
