//! Filesystem and configuration health checks
//!
//! Every check records one line in the report (`OK`, `OK: ...`, `WARN: ...` or `FAIL: ...`). A
//! `FAIL` flips the overall status; a `WARN` does not.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use sn_config::ConfigLoader;
use sysinfo::Disks;

const BYTES_PER_MB: u64 = 1024 * 1024;
const WRITE_PROBE: &str = ".health_write_test";

/// Outcome of the whole run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub ok: bool,
    pub details: BTreeMap<String, String>,
}

impl HealthReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn detail(&self, name: &str) -> Option<&str> {
        self.details.get(name).map(String::as_str)
    }

    /// Names of the checks that failed
    pub fn failures(&self) -> Vec<&str> {
        self.details.iter().filter(|(_, detail)| detail.starts_with("FAIL")).map(|(name, _)| name.as_str()).collect()
    }
}

/// Where to look and which thresholds to apply
#[derive(Debug, Clone)]
pub struct HealthOptions {
    pub config_dir: PathBuf,
    pub logs_dir: PathBuf,
    /// Prefix of the rolling log files inside `logs_dir`
    pub log_file: String,
    pub min_free_mb: u64,
    pub max_log_mb: u64,
}

impl HealthOptions {
    /// Default layout under a project root: `config/`, `logs/`, `sniper.log*`
    pub fn for_root(project_root: &Path) -> Self {
        Self {
            config_dir: project_root.join("config"),
            logs_dir: project_root.join("logs"),
            log_file: format!("{}.log", crate::APP_NAME),
            min_free_mb: 200,
            max_log_mb: 10,
        }
    }
}

enum Outcome {
    Ok(Option<String>),
    Warn(String),
    Fail(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ok(None) => write!(f, "OK"),
            Outcome::Ok(Some(msg)) => write!(f, "OK: {msg}"),
            Outcome::Warn(msg) => write!(f, "WARN: {msg}"),
            Outcome::Fail(msg) => write!(f, "FAIL: {msg}"),
        }
    }
}

struct Checks {
    ok: bool,
    details: BTreeMap<String, String>,
}

impl Checks {
    fn new() -> Self {
        Self { ok: true, details: BTreeMap::new() }
    }

    fn record(&mut self, name: &str, outcome: Outcome) {
        match &outcome {
            Outcome::Fail(msg) => {
                tracing::warn!("health check {name} failed: {msg}");
                self.ok = false;
            }
            Outcome::Warn(msg) => tracing::info!("health check {name}: {msg}"),
            Outcome::Ok(_) => tracing::debug!("health check {name} passed"),
        }
        self.details.insert(name.to_string(), outcome.to_string());
    }

    fn finish(self) -> HealthReport {
        HealthReport { ok: self.ok, details: self.details }
    }
}

fn check_dir_exists(path: &Path) -> Outcome {
    if path.is_dir() {
        Outcome::Ok(None)
    } else {
        Outcome::Fail(format!("missing directory {}", path.display()))
    }
}

fn check_file_exists(path: &Path) -> Outcome {
    if path.is_file() {
        Outcome::Ok(None)
    } else {
        Outcome::Fail(format!("missing file {}", path.display()))
    }
}

/// Creates the directory if needed, then writes and removes a probe file
fn check_writable_dir(path: &Path) -> Outcome {
    let probe = path.join(WRITE_PROBE);
    let result = fs::create_dir_all(path).and_then(|_| fs::write(&probe, b"ok")).and_then(|_| fs::remove_file(&probe));

    match result {
        Ok(()) => Outcome::Ok(None),
        Err(err) => Outcome::Fail(format!("write error in {}: {err}", path.display())),
    }
}

/// Free space of the mounted volume that holds `path`, in MB
fn free_space_mb(path: &Path) -> Result<u64, String> {
    let path = path.canonicalize().map_err(|err| err.to_string())?;
    let disks = Disks::new_with_refreshed_list();

    disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| disk.available_space() / BYTES_PER_MB)
        .ok_or_else(|| format!("no mounted volume found for {}", path.display()))
}

fn check_disk_space(path: &Path, min_free_mb: u64) -> Outcome {
    match free_space_mb(path) {
        Ok(free) if free >= min_free_mb => Outcome::Ok(Some(format!("{free} MB free"))),
        Ok(free) => Outcome::Fail(format!("low disk space ({free} MB free < {min_free_mb} MB)")),
        Err(err) => Outcome::Fail(format!("disk check error: {err}")),
    }
}

/// Largest rolling log file whose name starts with `prefix`
fn largest_log(logs_dir: &Path, prefix: &str) -> std::io::Result<Option<u64>> {
    if !logs_dir.is_dir() {
        return Ok(None);
    }

    let mut largest = None;
    for entry in fs::read_dir(logs_dir)? {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().starts_with(prefix) {
            continue;
        }
        let metadata = entry.metadata()?;
        if metadata.is_file() {
            largest = largest.max(Some(metadata.len()));
        }
    }
    Ok(largest)
}

/// Never fails the report: an oversized log is only a warning
fn check_log_size(logs_dir: &Path, prefix: &str, max_mb: u64) -> Outcome {
    match largest_log(logs_dir, prefix) {
        Ok(None) => Outcome::Warn("log file not created yet".to_string()),
        Ok(Some(bytes)) => {
            let size_mb = bytes as f64 / BYTES_PER_MB as f64;
            if size_mb <= max_mb as f64 {
                Outcome::Ok(Some(format!("{size_mb:.2} MB")))
            } else {
                Outcome::Warn(format!("large log ({size_mb:.2} MB > {max_mb} MB)"))
            }
        }
        Err(err) => Outcome::Warn(format!("log size check error: {err}")),
    }
}

/// Run every check with the default layout under `project_root`
pub fn run_health_checks(project_root: &Path) -> HealthReport {
    run_with_options(project_root, &HealthOptions::for_root(project_root))
}

pub fn run_with_options(project_root: &Path, options: &HealthOptions) -> HealthReport {
    let mut checks = Checks::new();

    checks.record("config_dir", check_dir_exists(&options.config_dir));
    checks.record("logs_dir", check_dir_exists(&options.logs_dir));
    checks.record("logs_writable", check_writable_dir(&options.logs_dir));

    let loader = ConfigLoader::new(&options.config_dir);
    for path in loader.required_files() {
        let name = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
        checks.record(&name, check_file_exists(&path));
    }

    let validation = match loader.load_all() {
        Ok(_) => Outcome::Ok(None),
        Err(err) => Outcome::Fail(err.to_string()),
    };
    checks.record("config_validation", validation);

    checks.record("disk_space", check_disk_space(project_root, options.min_free_mb));
    checks.record("log_size", check_log_size(&options.logs_dir, &options.log_file, options.max_log_mb));

    checks.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_format() {
        assert_eq!(Outcome::Ok(None).to_string(), "OK");
        assert_eq!(Outcome::Ok(Some("512 MB free".into())).to_string(), "OK: 512 MB free");
        assert_eq!(Outcome::Warn("log file not created yet".into()).to_string(), "WARN: log file not created yet");
        assert_eq!(Outcome::Fail("missing file x".into()).to_string(), "FAIL: missing file x");
    }

    #[test]
    fn test_warn_does_not_fail_report() {
        let mut checks = Checks::new();
        checks.record("a", Outcome::Ok(None));
        checks.record("b", Outcome::Warn("meh".into()));
        assert!(checks.finish().ok);

        let mut checks = Checks::new();
        checks.record("a", Outcome::Fail("broken".into()));
        checks.record("b", Outcome::Ok(None));
        let report = checks.finish();
        assert!(!report.ok);
        assert_eq!(report.failures(), ["a"]);
    }

    #[test]
    fn test_report_json() {
        let report = HealthReport { ok: false, details: [("config_dir".to_string(), "FAIL: missing directory config".to_string())].into() };
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(value["ok"], serde_json::json!(false));
        assert_eq!(value["details"]["config_dir"], serde_json::json!("FAIL: missing directory config"));
    }

    #[test]
    fn test_log_size_thresholds() {
        let dir = tempfile::tempdir().unwrap();

        assert!(check_log_size(dir.path(), "sniper.log", 10).to_string().starts_with("WARN: log file not created"));

        fs::write(dir.path().join("sniper.log.2026-10-18-09"), vec![b'x'; 2048]).unwrap();
        fs::write(dir.path().join("other.log"), vec![b'x'; 4 * 1024 * 1024]).unwrap();
        assert_eq!(check_log_size(dir.path(), "sniper.log", 10).to_string(), "OK: 0.00 MB");

        fs::write(dir.path().join("sniper.log.2026-10-18-10"), vec![b'x'; 2 * 1024 * 1024]).unwrap();
        assert_eq!(check_log_size(dir.path(), "sniper.log", 1).to_string(), "WARN: large log (2.00 MB > 1 MB)");
    }
}
