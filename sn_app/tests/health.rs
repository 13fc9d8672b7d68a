use std::fs;
use std::path::Path;

use sn_app::health::HealthOptions;
use sn_app::health::run_health_checks;
use sn_app::health::run_with_options;

fn write_config(root: &Path) {
    let config = root.join("config");
    fs::create_dir_all(&config).unwrap();
    fs::write(config.join("risk.yml"), "risk:\n  max_daily_dd_pct: 3\n  max_trade_r_pct: 0.5\n  target_rr: 2\n").unwrap();
    fs::write(config.join("system.yml"), "system:\n  mode: dev\n").unwrap();
    fs::write(config.join("api_limits.yml"), "fred:\n  requests_per_min: 120\n").unwrap();
}

#[test]
fn test_healthy_layout() {
    let root = tempfile::tempdir().unwrap();
    write_config(root.path());
    fs::create_dir_all(root.path().join("logs")).unwrap();

    let report = run_health_checks(root.path());

    for name in ["config_dir", "logs_dir", "logs_writable", "risk.yml", "system.yml", "api_limits.yml", "config_validation"] {
        assert_eq!(report.detail(name), Some("OK"), "{name}: {:?}", report.detail(name));
    }
    assert_eq!(report.detail("log_size"), Some("WARN: log file not created yet"));
    assert!(report.detail("disk_space").is_some());
    assert!(!root.path().join("logs").join(".health_write_test").exists());

    // Disk space depends on the host, everything else must pass
    assert!(report.failures().iter().all(|name| *name == "disk_space"), "failures: {:?}", report.failures());
}

#[test]
fn test_missing_config_dir() {
    let root = tempfile::tempdir().unwrap();

    let report = run_health_checks(root.path());

    assert!(!report.ok);
    assert!(report.detail("config_dir").unwrap().starts_with("FAIL: missing directory"));
    assert!(report.detail("risk.yml").unwrap().starts_with("FAIL: missing file"));
    assert!(report.detail("config_validation").unwrap().starts_with("FAIL: Config file not found"));

    // logs_dir is reported missing, then created by the writable check
    assert!(report.detail("logs_dir").unwrap().starts_with("FAIL"));
    assert_eq!(report.detail("logs_writable"), Some("OK"));
    assert!(root.path().join("logs").is_dir());
}

#[test]
fn test_invalid_config_fails_validation() {
    let root = tempfile::tempdir().unwrap();
    write_config(root.path());
    fs::write(root.path().join("config").join("api_limits.yml"), "binance:\n  spot:\n    requests_per_min: -1\n").unwrap();

    let report = run_health_checks(root.path());

    let detail = report.detail("config_validation").unwrap();
    assert!(detail.contains("binance.spot.requests_per_min"), "{detail}");
    assert!(!report.ok);
}

#[test]
fn test_disk_threshold_is_configurable() {
    let root = tempfile::tempdir().unwrap();
    write_config(root.path());

    let options = HealthOptions { min_free_mb: u64::MAX, ..HealthOptions::for_root(root.path()) };
    let report = run_with_options(root.path(), &options);

    assert!(report.detail("disk_space").unwrap().starts_with("FAIL"));
    assert!(!report.ok);
}
