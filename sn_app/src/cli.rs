use std::path::PathBuf;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "SNIPER_CONFIG_DIR";

/// Default config directory, relative to the working directory
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Returns the first command-line argument, or `default`
pub fn first_arg_or(default: &str) -> String {
    std::env::args().nth(1).unwrap_or_else(|| default.to_string())
}

/// Resolves the config directory: first argument, then `SNIPER_CONFIG_DIR`, then `config`
pub fn config_dir() -> PathBuf {
    resolve_config_dir(std::env::args().nth(1), std::env::var(CONFIG_DIR_ENV).ok())
}

fn resolve_config_dir(arg: Option<String>, env: Option<String>) -> PathBuf {
    arg.or(env).filter(|dir| !dir.trim().is_empty()).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR))
}
