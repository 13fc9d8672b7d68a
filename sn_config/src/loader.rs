use std::path::Path;
use std::path::PathBuf;

use config::Config;
use config::File;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::error::Result;
use crate::models::API_LIMITS_FILE;
use crate::models::ApiLimits;
use crate::models::RISK_FILE;
use crate::models::RiskConfig;
use crate::models::SYSTEM_FILE;
use crate::models::SystemConfig;
use crate::summary::LimitSummary;
use crate::summary::summarize_limits;

/// Everything the binaries need at boot
#[derive(Debug, Clone)]
pub struct Settings {
    pub risk: RiskConfig,
    pub system: SystemConfig,
    pub api_limits: ApiLimits,
}

impl Settings {
    pub fn limit_summary(&self) -> LimitSummary {
        summarize_limits(&self.api_limits)
    }
}

/// Reads and validates the YAML files of one config directory
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(config_dir: P) -> Self {
        Self { config_dir: config_dir.as_ref().to_path_buf() }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Paths of every file [`ConfigLoader::load_all`] reads
    pub fn required_files(&self) -> [PathBuf; 3] {
        [RISK_FILE, SYSTEM_FILE, API_LIMITS_FILE].map(|name| self.config_dir.join(name))
    }

    fn load_file(&self, name: &'static str) -> Result<Config> {
        let path = self.config_dir.join(name);
        if !path.is_file() {
            return Err(ConfigError::NotFound { path });
        }

        Config::builder().add_source(File::from(path.as_path())).build().map_err(|source| ConfigError::Load { file: name, source })
    }

    /// Read an optional top-level block, treating a missing key like an empty one
    fn get_block<T: for<'de> Deserialize<'de>>(config: &Config, file: &'static str, key: &str) -> Result<Option<T>> {
        match config.get::<Option<T>>(key) {
            Ok(block) => Ok(block),
            Err(config::ConfigError::NotFound(_)) => Ok(None),
            Err(source) => Err(ConfigError::Load { file, source }),
        }
    }

    pub fn load_risk(&self) -> Result<RiskConfig> {
        let config = self.load_file(RISK_FILE)?;
        let risk: RiskConfig =
            Self::get_block(&config, RISK_FILE, "risk")?.ok_or_else(|| ConfigError::invalid(RISK_FILE, "risk", "block is missing"))?;
        risk.validate()?;

        tracing::debug!("Loaded {RISK_FILE} from {}", self.config_dir.display());
        Ok(risk)
    }

    pub fn load_system(&self) -> Result<SystemConfig> {
        let config = self.load_file(SYSTEM_FILE)?;
        let system: SystemConfig = Self::get_block(&config, SYSTEM_FILE, "system")?.unwrap_or_default();
        system.validate()?;

        tracing::debug!("Loaded {SYSTEM_FILE} from {}", self.config_dir.display());
        Ok(system)
    }

    pub fn load_api_limits(&self) -> Result<ApiLimits> {
        let config = self.load_file(API_LIMITS_FILE)?;
        let limits: ApiLimits = config.try_deserialize().map_err(|source| ConfigError::Load { file: API_LIMITS_FILE, source })?;
        limits.validate()?;

        if !limits.extra.is_empty() {
            let names: Vec<&str> = limits.extra.keys().map(String::as_str).collect();
            tracing::debug!("{API_LIMITS_FILE} declares providers without a typed model: {names:?}");
        }

        Ok(limits)
    }

    pub fn load_all(&self) -> Result<Settings> {
        Ok(Settings { risk: self.load_risk()?, system: self.load_system()?, api_limits: self.load_api_limits()? })
    }

    /// Load and summarise `api_limits.yml` in one step
    pub fn load_limit_summary(&self) -> Result<LimitSummary> {
        Ok(summarize_limits(&self.load_api_limits()?))
    }
}
