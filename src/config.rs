// Handles configuration loading from the environment and the optional settings file.
use crate::credential::ServiceAccountKey;
use crate::error::{PresaleError, Result};
use chrono::FixedOffset;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const ENV_CREDENTIAL: &str = "GOOGLE_SERVICE_ACCOUNT";
pub const ENV_CALENDAR_ID: &str = "CALENDAR_ID";
pub const ENV_SETTINGS: &str = "THSR_SETTINGS";
pub const ENV_LOG: &str = "THSR_LOG";

fn default_source_url() -> String {
    "https://www.thsrc.com.tw/ArticleContent/60dbfb79-ac20-4280-8ffb-b09e7c94f043".to_string()
}
fn default_table_marker() -> String {
    "高鐵車票購買日期清單".to_string()
}
fn default_title_prefix() -> String {
    "高鐵".to_string()
}
fn default_time_zone() -> String {
    "Asia/Taipei".to_string()
}
fn default_utc_offset_minutes() -> i32 {
    480
}
fn default_fetch_timeout_secs() -> u64 {
    10
}
fn default_fetch_attempts() -> u32 {
    3
}
fn default_retry_delay_secs() -> u64 {
    2
}
fn default_calendar_api_base() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}

/// Tunables that rarely change. Every key is optional in the TOML file.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Settings {
    #[serde(default = "default_source_url")]
    pub source_url: String,
    #[serde(default = "default_table_marker")]
    pub table_marker: String,
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
    /// IANA name sent alongside event times.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Offset of `time_zone` from UTC. Taipei has no DST, so a fixed offset is enough.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_fetch_attempts")]
    pub fetch_attempts: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_calendar_api_base")]
    pub calendar_api_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            table_marker: default_table_marker(),
            title_prefix: default_title_prefix(),
            time_zone: default_time_zone(),
            utc_offset_minutes: default_utc_offset_minutes(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            fetch_attempts: default_fetch_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            calendar_api_base: default_calendar_api_base(),
        }
    }
}

impl Settings {
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text)
            .map_err(|e| PresaleError::Config(format!("invalid settings file: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            PresaleError::Config(format!("cannot read settings file {:?}: {}", path, e))
        })?;
        Self::from_toml(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.table_marker.trim().is_empty() {
            return Err(PresaleError::Config("table_marker must not be empty".into()));
        }
        if self.fetch_attempts == 0 {
            return Err(PresaleError::Config("fetch_attempts must be at least 1".into()));
        }
        self.offset().map(|_| ())
    }

    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            PresaleError::Config(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }
}

/// Everything a run needs, resolved once at startup and passed down by reference.
#[derive(Clone, Debug)]
pub struct Config {
    pub calendar_id: String,
    pub credential: ServiceAccountKey,
    pub settings: Settings,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn new(calendar_id: &str, credential: ServiceAccountKey, settings: Settings) -> Self {
        Self {
            calendar_id: calendar_id.to_string(),
            credential,
            settings,
            log_level: LevelFilter::Info,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = match lookup(ENV_LOG) {
            Some(level) if !level.trim().is_empty() => LevelFilter::from_str(level.trim())
                .map_err(|_| PresaleError::Config(format!("invalid {}: {}", ENV_LOG, level)))?,
            _ => LevelFilter::Info,
        };

        let calendar_id = lookup(ENV_CALENDAR_ID)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PresaleError::Config(format!("{} is not set", ENV_CALENDAR_ID)))?;

        let encoded = lookup(ENV_CREDENTIAL)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| PresaleError::Credential(format!("{} is not set", ENV_CREDENTIAL)))?;
        let credential = ServiceAccountKey::from_base64(&encoded)?;

        let settings = match lookup(ENV_SETTINGS) {
            Some(path) if !path.trim().is_empty() => Settings::load(Path::new(path.trim()))?,
            _ => Settings::default(),
        };

        Ok(Self {
            calendar_id,
            credential,
            settings,
            log_level,
        })
    }
}
