//! Configuration management module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::display::{parse_clock, DisplayConfig};

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub roster: RosterConfig,
    pub display: DisplayConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Summary API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub url: String,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Known employees and departments, used for filter choices and the roster check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub employees: Vec<String>,
    pub departments: Vec<String>,
}

/// Export output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Target directory; the user's download directory when unset.
    pub output_dir: Option<PathBuf>,
    pub file_prefix: String,
}

/// Log file settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily rolling log files. Console only when unset.
    pub directory: Option<PathBuf>,
}

impl AppConfig {
    /// Get config file path (same directory as executable).
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api.url.starts_with("http") {
            return Err(ConfigError::Validation(
                "API URL must start with http:// or https://".to_string(),
            ));
        }
        if self.api.timeout_secs < 1 {
            return Err(ConfigError::Validation("API timeout must be at least 1 second".to_string()));
        }
        if self.roster.employees.is_empty() {
            return Err(ConfigError::Validation("Roster must list at least one employee".to_string()));
        }
        if self.roster.employees.iter().any(|e| e.trim().is_empty()) {
            return Err(ConfigError::Validation("Employee names cannot be empty".to_string()));
        }
        if self.roster.departments.iter().any(|d| d.trim().is_empty()) {
            return Err(ConfigError::Validation("Department names cannot be empty".to_string()));
        }
        for (name, value) in [
            ("dark_start", &self.display.dark_start),
            ("light_start", &self.display.light_start),
        ] {
            if parse_clock(value).is_none() {
                return Err(ConfigError::Validation(format!(
                    "display.{name} must be HH:MM, got '{value}'"
                )));
            }
        }
        if self.export.file_prefix.trim().is_empty() {
            return Err(ConfigError::Validation("Export file prefix cannot be empty".to_string()));
        }
        if self.export.file_prefix.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "Export file prefix cannot contain path separators".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl RosterConfig {
    /// Upper bound for a day's reporting population.
    pub fn size(&self) -> usize {
        self.employees.len()
    }
}

impl ExportConfig {
    /// Resolved output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            directories::UserDirs::new()
                .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/exec".to_string(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            employees: ["เจ", "กอล์ฟ", "ปอง", "เจ้าสัว", "ปริม", "จ๊าบ", "รีน", "เช็ค", "เบนซ์"]
                .into_iter()
                .map(String::from)
                .collect(),
            departments: ["IT", "HR", "Finance", "Marketing", "Operations"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            file_prefix: "attendance_report".to_string(),
        }
    }
}
