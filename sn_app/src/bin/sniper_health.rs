use std::path::PathBuf;

use sn_app::cli;
use sn_app::health;
use sn_app::tracing_setup;

fn main() -> anyhow::Result<()> {
    // stdout carries the JSON report only
    tracing_setup::init_stderr(tracing::Level::WARN);

    let root = PathBuf::from(cli::first_arg_or("."));
    let report = health::run_health_checks(&root);

    println!("{}", report.to_json()?);

    if !report.ok {
        tracing::warn!("health checks failed: {:?}", report.failures());
        std::process::exit(1);
    }
    Ok(())
}
