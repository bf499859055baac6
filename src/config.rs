//! Runtime configuration, optionally loaded from a JSON file.

use crate::game_automation::match_engine::DEFAULT_TEXT_POLL_INTERVAL;
use crate::game_automation::tasks::DEFAULT_GAME_PACKAGE;
use crate::game_automation::types::{
    DEFAULT_FUZZY_THRESHOLD, DEFAULT_IMAGE_INTERVAL, DEFAULT_IMAGE_THRESHOLD,
    DEFAULT_IMAGE_TIMEOUT, DEFAULT_SETTLE_DELAY, DEFAULT_TEXT_TIMEOUT, TargetDefaults,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Every field is optional in the file; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Directory holding the reference images (`<id>.png`)
    pub template_dir: PathBuf,
    pub text_timeout_secs: u64,
    pub settle_delay_ms: u64,
    pub fuzzy_threshold: f64,
    pub text_poll_interval_ms: u64,
    pub image_threshold: f64,
    pub image_timeout_secs: u64,
    pub image_poll_interval_ms: u64,
    /// Tesseract language pack, e.g. `chi_sim`
    pub ocr_language: String,
    pub tesseract_bin: String,
    /// When set, the frame of a failed task is saved here
    pub diagnostics_dir: Option<PathBuf>,
    /// Overrides `~/.crosscore-adb-run/device.json`
    pub device_record_path: Option<PathBuf>,
    pub game_package: String,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("images"),
            text_timeout_secs: DEFAULT_TEXT_TIMEOUT.as_secs(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            text_poll_interval_ms: DEFAULT_TEXT_POLL_INTERVAL.as_millis() as u64,
            image_threshold: DEFAULT_IMAGE_THRESHOLD,
            image_timeout_secs: DEFAULT_IMAGE_TIMEOUT.as_secs(),
            image_poll_interval_ms: DEFAULT_IMAGE_INTERVAL.as_millis() as u64,
            ocr_language: "chi_sim".to_string(),
            tesseract_bin: "tesseract".to_string(),
            diagnostics_dir: None,
            device_record_path: None,
            game_package: DEFAULT_GAME_PACKAGE.to_string(),
        }
    }
}

impl AutomationConfig {
    /// Defaults when `path` is `None`, otherwise the parsed file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        log::debug!("⚙️ Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("fuzzy_threshold", self.fuzzy_threshold),
            ("image_threshold", self.image_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.text_poll_interval_ms == 0 || self.image_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll intervals must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn text_poll_interval(&self) -> Duration {
        Duration::from_millis(self.text_poll_interval_ms)
    }

    /// Timeouts and thresholds handed to the match engine for task targets.
    pub fn target_defaults(&self) -> TargetDefaults {
        TargetDefaults {
            text_timeout: Duration::from_secs(self.text_timeout_secs),
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            fuzzy_threshold: self.fuzzy_threshold,
            image_threshold: self.image_threshold,
            image_timeout: Duration::from_secs(self.image_timeout_secs),
            image_interval: Duration::from_millis(self.image_poll_interval_ms),
        }
    }
}
