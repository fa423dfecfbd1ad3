//! Runtime configuration from environment variables.
//!
//! | Variable                  | Default                 |
//! |---------------------------|-------------------------|
//! | `GLYCOSENSE_MODEL_PATH`   | `models`                |
//! | `GLYCOSENSE_MODEL_SHA256` | unset (no pin)          |
//! | `GLYCOSENSE_LOG_MODE`     | `auto`                  |
//! | `GLYCOSENSE_LOG_FILE`     | `glycosense.log`        |

use std::path::PathBuf;

pub const MODEL_PATH_ENV: &str = "GLYCOSENSE_MODEL_PATH";
pub const MODEL_SHA256_ENV: &str = "GLYCOSENSE_MODEL_SHA256";
pub const LOG_MODE_ENV: &str = "GLYCOSENSE_LOG_MODE";
pub const LOG_FILE_ENV: &str = "GLYCOSENSE_LOG_FILE";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is an interactive terminal, stdout otherwise
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Resolve `Auto` against whether stdout is a terminal.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            // Logging to the terminal would corrupt the full-screen UI.
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory containing `model.json`, or the file itself
    pub model_path: PathBuf,
    /// Optional SHA-256 hex digest the model artifact must match
    pub model_sha256: Option<String>,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models"),
            model_sha256: None,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("glycosense.log"),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            model_path: get(MODEL_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            model_sha256: get(MODEL_SHA256_ENV).map(|v| v.trim().to_string()),
            log_mode: get(LOG_MODE_ENV)
                .map(|v| LogMode::parse(&v))
                .unwrap_or(defaults.log_mode),
            log_file: get(LOG_FILE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
        }
    }
}
