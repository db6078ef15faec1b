//! Configuration management module.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::{ClassificationPolicy, DEFAULT_LATE_AFTER};
use crate::error::{AppError, Result as AppResult};
use crate::source::{AttendanceSource, EmployeeDirectory, HttpSource, JsonFileSource};

const LATE_AFTER_FORMAT: &str = "%H:%M:%S";

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
    pub source: SourceConfig,
    pub policy: PolicyConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Where attendance records come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Offline JSON files written by the check-in service.
    Json,
    /// Check-in backend REST API.
    Http,
}

/// Attendance source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub attendance_path: PathBuf,
    pub employees_path: PathBuf,
    pub base_url: String,
    /// HTTP request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

/// Classification policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Check-ins after this `HH:MM:SS` time are late.
    pub late_after: String,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// List employees with no check-in as absent.
    pub synthesize_absent: bool,
    pub output_dir: PathBuf,
}

/// Log output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write daily rolling log files here instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
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

    /// Per-user config path: `{config_dir}/attendance-report/config.toml`.
    pub fn user_path() -> Option<PathBuf> {
        BaseDirs::new().map(|b| b.config_dir().join("attendance-report").join("config.toml"))
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
        match self.source.kind {
            SourceKind::Json => {
                if self.source.attendance_path.as_os_str().is_empty() {
                    return Err(ConfigError::Validation("Attendance file path cannot be empty".to_string()));
                }
                if self.source.employees_path.as_os_str().is_empty() {
                    return Err(ConfigError::Validation("Employees file path cannot be empty".to_string()));
                }
            }
            SourceKind::Http => {
                if !self.source.base_url.starts_with("http") {
                    return Err(ConfigError::Validation(
                        "Backend URL must start with http:// or https://".to_string(),
                    ));
                }
            }
        }
        if self.source.timeout_secs < 1 {
            return Err(ConfigError::Validation("Timeout must be at least 1 second".to_string()));
        }
        if self.policy.late_after_time().is_none() {
            return Err(ConfigError::Validation(format!(
                "Late cutoff '{}' is not a HH:MM:SS time",
                self.policy.late_after
            )));
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

impl SourceConfig {
    /// Build the configured attendance source and employee directory.
    pub fn build(&self) -> AppResult<(Arc<dyn AttendanceSource>, Arc<dyn EmployeeDirectory>)> {
        match self.kind {
            SourceKind::Json => {
                let source = Arc::new(JsonFileSource::new(&self.attendance_path, &self.employees_path));
                let attendance: Arc<dyn AttendanceSource> = source.clone();
                let directory: Arc<dyn EmployeeDirectory> = source;
                Ok((attendance, directory))
            }
            SourceKind::Http => {
                let source = Arc::new(HttpSource::new(&self.base_url, Duration::from_secs(self.timeout_secs))?);
                let attendance: Arc<dyn AttendanceSource> = source.clone();
                let directory: Arc<dyn EmployeeDirectory> = source;
                Ok((attendance, directory))
            }
        }
    }
}

impl PolicyConfig {
    fn late_after_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.late_after.trim(), LATE_AFTER_FORMAT).ok()
    }

    /// Classification policy for the configured cutoff.
    pub fn to_policy(&self) -> AppResult<ClassificationPolicy> {
        self.late_after_time()
            .map(ClassificationPolicy::new)
            .ok_or_else(|| AppError::config(format!("Invalid late cutoff '{}'", self.late_after)))
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Json,
            attendance_path: PathBuf::from("data/offline_attendance.json"),
            employees_path: PathBuf::from("data/offline_employees.json"),
            base_url: "http://localhost:5001".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            late_after: DEFAULT_LATE_AFTER.format(LATE_AFTER_FORMAT).to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            synthesize_absent: false,
            output_dir: PathBuf::from("."),
        }
    }
}
