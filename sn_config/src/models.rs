use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;
use crate::error::Result;

pub(crate) const RISK_FILE: &str = "risk.yml";
pub(crate) const SYSTEM_FILE: &str = "system.yml";
pub(crate) const API_LIMITS_FILE: &str = "api_limits.yml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Range checks shared by every config model, scoped to one file for error reporting
struct Validator {
    file: &'static str,
}

impl Validator {
    fn new(file: &'static str) -> Self {
        Self { file }
    }

    fn non_negative_int(&self, field: &str, value: Option<i64>) -> Result<()> {
        match value {
            Some(v) if v < 0 => Err(ConfigError::invalid(self.file, field, format!("must be >= 0, got {v}"))),
            _ => Ok(()),
        }
    }

    fn non_negative_float(&self, field: &str, value: Option<f64>) -> Result<()> {
        match value {
            Some(v) if !v.is_finite() || v < 0.0 => Err(ConfigError::invalid(self.file, field, format!("must be a finite value >= 0, got {v}"))),
            _ => Ok(()),
        }
    }

    fn positive_float(&self, field: &str, value: f64) -> Result<()> {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::invalid(self.file, field, format!("must be a finite value > 0, got {value}")))
        }
    }
}

/// Account-level risk limits from the `risk:` block of `risk.yml`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RiskConfig {
    /// Maximum daily drawdown, in percent of equity
    pub max_daily_dd_pct: f64,

    /// Maximum risk per trade, in percent of equity
    pub max_trade_r_pct: f64,

    /// Target reward/risk ratio
    pub target_rr: f64,
}

impl RiskConfig {
    pub fn validate(&self) -> Result<()> {
        let v = Validator::new(RISK_FILE);
        v.non_negative_float("risk.max_daily_dd_pct", Some(self.max_daily_dd_pct))?;
        v.non_negative_float("risk.max_trade_r_pct", Some(self.max_trade_r_pct))?;
        v.positive_float("risk.target_rr", self.target_rr)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Dev,
    Live,
    Backtest,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Dev => write!(f, "dev"),
            Mode::Live => write!(f, "live"),
            Mode::Backtest => write!(f, "backtest"),
        }
    }
}

/// Where and how verbosely the binaries log
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for rolling log files
    pub dir: String,

    /// Default level when `RUST_LOG` is unset
    pub level: String,

    /// Mirror log lines to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { dir: "logs".to_string(), level: "info".to_string(), stdout: true }
    }
}

/// Process-wide settings from the `system:` block of `system.yml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub mode: Mode,
    pub logging: LoggingConfig,
}

impl SystemConfig {
    pub fn validate(&self) -> Result<()> {
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::invalid(
                SYSTEM_FILE,
                "system.logging.level",
                format!("must be one of {LOG_LEVELS:?}, got {:?}", self.logging.level),
            ));
        }
        if self.logging.dir.trim().is_empty() {
            return Err(ConfigError::invalid(SYSTEM_FILE, "system.logging.dir", "must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BinanceSpotLimits {
    pub requests_per_min: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BinanceFuturesLimits {
    pub requests_per_min: Option<i64>,
    pub orders_per_min: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BinanceLimits {
    pub spot: Option<BinanceSpotLimits>,
    pub futures: Option<BinanceFuturesLimits>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TelegramLimits {
    pub per_chat_rps: Option<f64>,
    pub per_group_rpm: Option<i64>,
    pub global_rps: Option<f64>,
}

/// Daily quota plus a per-second burst ceiling (NewsAPI, GNews)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DailyQuotaLimits {
    pub requests_per_day: Option<i64>,
    pub burst_rps: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FredLimits {
    pub requests_per_min: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct YahooProviderLimits {
    pub name: Option<String>,
    pub requests_per_min: Option<i64>,
    pub requests_per_day: Option<i64>,
    pub notes: Option<String>,
}

/// Newsdata declares a 15-minute window, optionally overridden by a per-minute figure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NewsdataLimits {
    pub requests_per_15min: Option<i64>,
    pub requests_per_min: Option<f64>,
}

/// Declared quotas for every external API, as read from `api_limits.yml`
///
/// Every provider is optional. Unknown top-level blocks are kept in `extra` so a new API can be
/// declared in the file before any code reads it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ApiLimits {
    pub binance: Option<BinanceLimits>,
    pub telegram: Option<TelegramLimits>,
    pub newsapi: Option<DailyQuotaLimits>,
    pub fred: Option<FredLimits>,
    pub yahoo_provider: Option<YahooProviderLimits>,
    pub gnews: Option<DailyQuotaLimits>,
    pub newsdata: Option<NewsdataLimits>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ApiLimits {
    pub fn validate(&self) -> Result<()> {
        let v = Validator::new(API_LIMITS_FILE);

        if let Some(binance) = &self.binance {
            if let Some(spot) = &binance.spot {
                v.non_negative_int("binance.spot.requests_per_min", spot.requests_per_min)?;
            }
            if let Some(futures) = &binance.futures {
                v.non_negative_int("binance.futures.requests_per_min", futures.requests_per_min)?;
                v.non_negative_int("binance.futures.orders_per_min", futures.orders_per_min)?;
            }
        }

        if let Some(telegram) = &self.telegram {
            v.non_negative_float("telegram.per_chat_rps", telegram.per_chat_rps)?;
            v.non_negative_int("telegram.per_group_rpm", telegram.per_group_rpm)?;
            v.non_negative_float("telegram.global_rps", telegram.global_rps)?;
        }

        for (name, daily) in [("newsapi", &self.newsapi), ("gnews", &self.gnews)] {
            if let Some(daily) = daily {
                v.non_negative_int(&format!("{name}.requests_per_day"), daily.requests_per_day)?;
                v.non_negative_float(&format!("{name}.burst_rps"), daily.burst_rps)?;
            }
        }

        if let Some(fred) = &self.fred {
            v.non_negative_int("fred.requests_per_min", fred.requests_per_min)?;
        }

        if let Some(yahoo) = &self.yahoo_provider {
            v.non_negative_int("yahoo_provider.requests_per_min", yahoo.requests_per_min)?;
            v.non_negative_int("yahoo_provider.requests_per_day", yahoo.requests_per_day)?;
        }

        if let Some(newsdata) = &self.newsdata {
            v.non_negative_int("newsdata.requests_per_15min", newsdata.requests_per_15min)?;
            v.non_negative_float("newsdata.requests_per_min", newsdata.requests_per_min)?;
        }

        Ok(())
    }
}
