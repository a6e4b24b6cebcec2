use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;
use wildlink_types::{PlayerLocale, MAX_LABEL_LENGTH};

/// Configuration for a [crate::Session].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub locale: PlayerLocale,
    #[serde(default = "default_max_codename_attempts")]
    pub max_codename_attempts: usize,
    #[serde(default)]
    pub check_challenge: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: usize },
    #[error("{field} must be 1..={max} characters (got {value:?})")]
    InvalidLabel {
        field: &'static str,
        value: String,
        max: usize,
    },
}

#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    pub locale: PlayerLocale,
    pub max_codename_attempts: usize,
    pub check_challenge: bool,
    pub log_level: Level,
}

fn default_max_codename_attempts() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: PlayerLocale::default(),
            max_codename_attempts: default_max_codename_attempts(),
            check_challenge: false,
            log_level: default_log_level(),
        }
    }
}

impl Default for ValidatedConfig {
    fn default() -> Self {
        Self {
            locale: PlayerLocale::default(),
            max_codename_attempts: default_max_codename_attempts(),
            check_challenge: false,
            log_level: Level::INFO,
        }
    }
}

fn check_label(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || value.len() > MAX_LABEL_LENGTH {
        return Err(ConfigError::InvalidLabel {
            field,
            value: value.to_string(),
            max: MAX_LABEL_LENGTH,
        });
    }
    Ok(())
}

impl Config {
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if self.max_codename_attempts == 0 {
            return Err(ConfigError::InvalidNonZero {
                field: "max_codename_attempts",
                value: self.max_codename_attempts,
            });
        }
        check_label("locale.country", &self.locale.country)?;
        check_label("locale.language", &self.locale.language)?;
        check_label("locale.timezone", &self.locale.timezone)?;

        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        Ok(ValidatedConfig {
            locale: self.locale,
            max_codename_attempts: self.max_codename_attempts,
            check_challenge: self.check_challenge,
            log_level,
        })
    }
}
