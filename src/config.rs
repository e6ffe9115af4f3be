use crate::billing::{parse_rate, validate_minimum, validate_rate};
use crate::error::AppError;
use crate::models::{BillingConfig, DEFAULT_MINIMUM_BILLABLE_MINUTES};
use ::config::{Config, Environment, File};
use chrono::format::{Item, StrftimeItems};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SERVICE_NAME: &str = "timebill";
pub const ENV_PREFIX: &str = "TIMEBILL";

fn app_home_dir() -> Result<PathBuf, AppError> {
    if let Ok(custom) = std::env::var("TIMEBILL_HOME") {
        return Ok(PathBuf::from(custom));
    }

    if let Some(dirs) = ProjectDirs::from("com", "timebill", SERVICE_NAME) {
        let candidate = dirs.data_local_dir().to_path_buf();
        if fs::create_dir_all(&candidate).is_ok() {
            return Ok(candidate);
        }
    }

    let cwd = std::env::current_dir()?;
    Ok(cwd.join(".timebill"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub hourly_rate: Option<f64>,
    pub minimum_billable_minutes: f64,
    pub currency_symbol: String,
    pub report_title: String,
    pub timestamp_format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hourly_rate: None,
            minimum_billable_minutes: DEFAULT_MINIMUM_BILLABLE_MINUTES,
            currency_symbol: "€".into(),
            report_title: "Time Tracker Data".into(),
            timestamp_format: "%d-%m-%Y %H:%M:%S".into(),
        }
    }
}

/// A rate as written by the user: a number, or text from env vars and
/// quoted TOML values.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StoredRate {
    Number(f64),
    Text(String),
}

impl StoredRate {
    fn resolve(self) -> Result<f64, AppError> {
        match self {
            StoredRate::Number(rate) => validate_rate(rate),
            StoredRate::Text(raw) => parse_rate(&raw),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct StoredConfig {
    hourly_rate: Option<StoredRate>,
    minimum_billable_minutes: f64,
    currency_symbol: String,
    report_title: String,
    timestamp_format: String,
}

impl Default for StoredConfig {
    fn default() -> Self {
        let defaults = AppConfig::default();
        Self {
            hourly_rate: None,
            minimum_billable_minutes: defaults.minimum_billable_minutes,
            currency_symbol: defaults.currency_symbol,
            report_title: defaults.report_title,
            timestamp_format: defaults.timestamp_format,
        }
    }
}

impl TryFrom<StoredConfig> for AppConfig {
    type Error = AppError;

    fn try_from(stored: StoredConfig) -> Result<Self, Self::Error> {
        validate_timestamp_format(&stored.timestamp_format)?;
        Ok(Self {
            hourly_rate: stored.hourly_rate.map(StoredRate::resolve).transpose()?,
            minimum_billable_minutes: validate_minimum(stored.minimum_billable_minutes)?,
            currency_symbol: stored.currency_symbol,
            report_title: stored.report_title,
            timestamp_format: stored.timestamp_format,
        })
    }
}

impl AppConfig {
    /// Resolves the numeric policy for one run. Overrides come from the
    /// command line and win over stored values.
    pub fn billing(
        &self,
        rate_override: Option<f64>,
        minimum_override: Option<f64>,
    ) -> Result<Option<BillingConfig>, AppError> {
        let minimum = validate_minimum(minimum_override.unwrap_or(self.minimum_billable_minutes))?;
        let Some(rate) = rate_override.or(self.hourly_rate) else {
            return Ok(None);
        };
        Ok(Some(BillingConfig {
            hourly_rate: validate_rate(rate)?,
            minimum_billable_minutes: minimum,
        }))
    }
}

pub fn validate_timestamp_format(format: &str) -> Result<(), AppError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(AppError::Config(format!(
            "invalid timestamp_format '{format}'"
        )));
    }
    Ok(())
}

pub fn config_dir() -> Result<PathBuf, AppError> {
    Ok(app_home_dir()?.join("config"))
}

pub fn config_path() -> Result<PathBuf, AppError> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn ensure_dirs() -> Result<(), AppError> {
    fs::create_dir_all(config_dir()?)?;
    Ok(())
}

/// Layers defaults, the optional config file and `TIMEBILL_*` env vars.
pub fn load_config_from(path: &Path) -> Result<AppConfig, AppError> {
    let defaults = AppConfig::default();
    let settings = Config::builder()
        .set_default(
            "minimum_billable_minutes",
            defaults.minimum_billable_minutes,
        )?
        .set_default("currency_symbol", defaults.currency_symbol)?
        .set_default("report_title", defaults.report_title)?
        .set_default("timestamp_format", defaults.timestamp_format)?
        .add_source(File::from(path.to_path_buf()).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?;

    let cfg = AppConfig::try_from(settings.try_deserialize::<StoredConfig>()?)?;
    debug!(path = %path.display(), has_rate = cfg.hourly_rate.is_some(), "loaded config");
    Ok(cfg)
}

pub fn load_config() -> Result<AppConfig, AppError> {
    load_config_from(&config_path()?)
}

pub fn save_config(config: &AppConfig) -> Result<(), AppError> {
    ensure_dirs()?;
    let path = config_path()?;
    let raw = toml::to_string_pretty(config)?;
    fs::write(path, raw)?;
    Ok(())
}

/// Reads only the file layer, so values coming from the environment are not
/// written back to disk.
pub fn load_stored_config() -> Result<AppConfig, AppError> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path)?;
    AppConfig::try_from(toml::from_str::<StoredConfig>(&raw)?)
}

pub fn ensure_initialized() -> Result<(), AppError> {
    ensure_dirs()?;
    let cfg_path = config_path()?;
    if !Path::new(&cfg_path).exists() {
        save_config(&AppConfig::default())?;
    }
    Ok(())
}
