use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CounselConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Applies to plain JSON requests only; the event stream stays open
    /// for as long as the analysis runs.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_banner_interval")]
    pub banner_interval_secs: u64,

    #[serde(default = "default_message_preview_chars")]
    pub message_preview_chars: usize,

    #[serde(default = "default_handoff_ttl")]
    pub handoff_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub color: bool,

    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,

    #[serde(default)]
    pub compact: bool,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    3
}

fn default_banner_interval() -> u64 {
    3
}

fn default_message_preview_chars() -> usize {
    500
}

fn default_handoff_ttl() -> u64 {
    3600
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_true() -> bool {
    true
}

fn default_datetime_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            banner_interval_secs: default_banner_interval(),
            message_preview_chars: default_message_preview_chars(),
            handoff_ttl_secs: default_handoff_ttl(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            datetime_format: default_datetime_format(),
            compact: false,
        }
    }
}

impl CounselConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> Result<Self, ConfigLoadError> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        // COUNSEL_ANALYSIS__POLL_INTERVAL_SECS style keys; single underscores
        // stay inside field names.
        builder = builder.add_source(
            Environment::with_prefix("COUNSEL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;

        let mut counsel_config: CounselConfig = config.try_deserialize()?;

        if let Ok(url) = std::env::var("COUNSEL_API_URL") {
            counsel_config.api.base_url = url;
        }

        if let Ok(level) = std::env::var("COUNSEL_LOG_LEVEL") {
            counsel_config.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            counsel_config.logging.level = level;
        }

        if let Ok(interval) = std::env::var("COUNSEL_POLL_INTERVAL") {
            if let Ok(secs) = interval.parse() {
                counsel_config.analysis.poll_interval_secs = secs;
            }
        }

        counsel_config.validate()?;

        Ok(counsel_config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigLoadError::MissingRequired("api.base_url".to_string()));
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(ConfigLoadError::InvalidValue {
                key: "api.base_url".to_string(),
                message: "Must be an http:// or https:// URL".to_string(),
            });
        }

        if self.api.request_timeout_secs == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "api.request_timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.analysis.poll_interval_secs == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "analysis.poll_interval_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.analysis.banner_interval_secs == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "analysis.banner_interval_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(ConfigLoadError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.analysis.poll_interval_secs)
    }

    pub fn banner_interval(&self) -> Duration {
        Duration::from_secs(self.analysis.banner_interval_secs)
    }

    pub fn handoff_ttl(&self) -> Duration {
        Duration::from_secs(self.analysis.handoff_ttl_secs)
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("counsel.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("counsel").join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".counsel").join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    for path in get_dotenv_paths() {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn get_dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".counsel").join(".env"));
    }

    paths
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("counsel"))
}

pub fn get_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("counsel"))
}

pub fn ensure_cache_dir() -> Result<PathBuf, std::io::Error> {
    let cache_dir = get_cache_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine cache directory",
        )
    })?;

    if !cache_dir.exists() {
        std::fs::create_dir_all(&cache_dir)?;
    }

    Ok(cache_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = CounselConfig::default();

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.analysis.poll_interval_secs, 3);
        assert_eq!(config.analysis.banner_interval_secs, 3);
        assert_eq!(config.analysis.message_preview_chars, 500);
        assert_eq!(config.analysis.handoff_ttl_secs, 3600);
        assert_eq!(config.logging.level, "warn");
        assert!(!config.logging.json_format);
        assert!(config.display.color);
        assert!(!config.display.compact);
    }

    #[test]
    fn test_validation_valid_config() {
        let config = CounselConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_base_url() {
        let mut config = CounselConfig::default();
        config.api.base_url = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigLoadError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_validation_non_http_base_url() {
        let mut config = CounselConfig::default();
        config.api.base_url = "ftp://backend.local".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_intervals() {
        let mut config = CounselConfig::default();
        config.analysis.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = CounselConfig::default();
        config.analysis.banner_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = CounselConfig::default();
        config.api.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = CounselConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_complex_log_level() {
        let mut config = CounselConfig::default();
        config.logging.level = "counsel_core=debug,reqwest=warn".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_helper_methods() {
        let mut config = CounselConfig::default();
        config.api.base_url = "https://council.example.com/".to_string();
        assert_eq!(config.base_url(), "https://council.example.com");
        assert_eq!(config.poll_interval(), Duration::from_secs(3));
        assert_eq!(config.handoff_ttl(), Duration::from_secs(3600));
        assert_eq!(config.log_level(), "warn");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counsel.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"https://council.example.com\"\n\n[analysis]\nbanner_interval_secs = 5"
        )
        .unwrap();

        let config = CounselConfig::load_from_paths(vec![path]).unwrap();
        if std::env::var("COUNSEL_API_URL").is_err() {
            assert_eq!(config.api.base_url, "https://council.example.com");
        }
        assert_eq!(config.analysis.banner_interval_secs, 5);
        assert_eq!(config.analysis.message_preview_chars, 500);
    }

    #[test]
    fn test_directory_helpers() {
        assert!(get_config_dir().is_some());
        assert!(get_cache_dir().is_some());
    }
}
