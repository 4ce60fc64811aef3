//! Player configuration.
//!
//! The player keeps no state between runs, but its tunables (tick intervals,
//! bar stride, logging) can be overridden from an optional TOML file in the
//! user's config directory (typically ~/.config/bounce/config.toml). The file
//! is only ever read; a missing file means defaults.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_LOG_FILE, DEFAULT_STRIDE, MAX_AMPLITUDE, PROGRESS_INTERVAL_MS,
    VISUALIZATION_INTERVAL_MS,
};
use crate::error::{PlayerError, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
    #[serde(default = "default_visualization_interval_ms")]
    pub visualization_interval_ms: u64,
    #[serde(default = "default_stride")]
    pub stride: u32,
    #[serde(default = "default_max_amplitude")]
    pub max_amplitude: i32,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_start_dir")]
    pub start_dir: PathBuf,
}

fn default_progress_interval_ms() -> u64 {
    PROGRESS_INTERVAL_MS
}

fn default_visualization_interval_ms() -> u64 {
    VISUALIZATION_INTERVAL_MS
}

fn default_stride() -> u32 {
    DEFAULT_STRIDE
}

fn default_max_amplitude() -> i32 {
    MAX_AMPLITUDE
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_start_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            progress_interval_ms: default_progress_interval_ms(),
            visualization_interval_ms: default_visualization_interval_ms(),
            stride: default_stride(),
            max_amplitude: default_max_amplitude(),
            log_file: default_log_file(),
            log_level: default_log_level(),
            start_dir: default_start_dir(),
        }
    }

    pub fn config_dir() -> Result<PathBuf> {
        // Check for XDG_CONFIG_HOME first (useful for testing)
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config).join("bounce")
        } else {
            dirs::config_dir()
                .ok_or_else(|| PlayerError::Config("unable to find config directory".into()))?
                .join("bounce")
        };
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Default::default());
        }

        let contents = fs::read_to_string(&config_path)
            .map_err(|e| PlayerError::Config(format!("{}: {e}", config_path.display())))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).map_err(|e| PlayerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.progress_interval_ms == 0 {
            return Err(PlayerError::Config(
                "progress_interval_ms must be greater than zero".into(),
            ));
        }
        if self.visualization_interval_ms == 0 {
            return Err(PlayerError::Config(
                "visualization_interval_ms must be greater than zero".into(),
            ));
        }
        if self.stride == 0 {
            return Err(PlayerError::Config("stride must be greater than zero".into()));
        }
        if self.max_amplitude <= 0 {
            return Err(PlayerError::Config(
                "max_amplitude must be greater than zero".into(),
            ));
        }
        self.log_level_filter()?;
        Ok(())
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn visualization_interval(&self) -> Duration {
        Duration::from_millis(self.visualization_interval_ms)
    }

    pub fn log_level_filter(&self) -> Result<log::LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| PlayerError::Config(format!("unknown log level: {}", self.log_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.progress_interval_ms, 500);
        assert_eq!(config.visualization_interval_ms, 30);
        assert_eq!(config.max_amplitude, 128);
        assert_eq!(config.start_dir, PathBuf::from("."));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml("stride = 4\nlog_level = \"debug\"").unwrap();
        assert_eq!(config.stride, 4);
        assert_eq!(config.log_level_filter().unwrap(), log::LevelFilter::Debug);
        assert_eq!(config.progress_interval(), Duration::from_millis(500));
        assert_eq!(config.visualization_interval(), Duration::from_millis(30));
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_zero_stride_rejected() {
        let result = Config::from_toml("stride = 0");
        assert!(matches!(result, Err(PlayerError::Config(_))));
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(Config::from_toml("progress_interval_ms = 0").is_err());
        assert!(Config::from_toml("visualization_interval_ms = 0").is_err());
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let result = Config::from_toml("log_level = \"chatty\"");
        assert!(matches!(result, Err(PlayerError::Config(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(Config::from_toml("stride = [").is_err());
    }
}
