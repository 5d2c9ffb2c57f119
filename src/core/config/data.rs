use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::constants::{
    DEFAULT_BASE_URL, DEFAULT_GREETING, DEFAULT_MODEL, DEFAULT_SYSTEM_INSTRUCTION,
    SNAPSHOT_FILE_NAME,
};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the generation API (e.g. "https://generativelanguage.googleapis.com/v1beta")
    pub base_url: Option<String>,
    /// Model name (e.g. "gemini-2.5-flash")
    pub model: Option<String>,
    /// Where the conversation snapshot lives
    pub memory_file: Option<PathBuf>,
    /// Send a follow-up when resuming a saved conversation
    pub autoreply: Option<bool>,
    /// First assistant message of a fresh conversation
    pub greeting: Option<String>,
    /// Instruction turn sent ahead of the history on every request
    pub system_instruction: Option<String>,
}

/// Keys accepted by `gemchat set` / `gemchat unset`.
pub const CONFIG_KEYS: &[&str] = &[
    "base-url",
    "model",
    "memory-file",
    "autoreply",
    "greeting",
    "system-instruction",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigKeyError {
    UnknownKey(String),
    InvalidValue { key: String, value: String },
}

impl fmt::Display for ConfigKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKeyError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {key} (expected one of: {})",
                CONFIG_KEYS.join(", ")
            ),
            ConfigKeyError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {key}: {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigKeyError {}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigKeyError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(ConfigKeyError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn greeting(&self) -> &str {
        self.greeting.as_deref().unwrap_or(DEFAULT_GREETING)
    }

    pub fn system_instruction(&self) -> &str {
        self.system_instruction
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_INSTRUCTION)
    }

    pub fn autoreply_enabled(&self) -> bool {
        self.autoreply.unwrap_or(false)
    }

    pub fn memory_file_path(&self) -> PathBuf {
        self.memory_file
            .clone()
            .unwrap_or_else(default_memory_file_path)
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ConfigKeyError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }

        match key {
            "base-url" => self.base_url = Some(value.to_string()),
            "model" => self.model = Some(value.to_string()),
            "memory-file" => self.memory_file = Some(PathBuf::from(value)),
            "autoreply" => self.autoreply = Some(parse_bool(key, value)?),
            "greeting" => self.greeting = Some(value.to_string()),
            "system-instruction" => self.system_instruction = Some(value.to_string()),
            _ => return Err(ConfigKeyError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), ConfigKeyError> {
        match key {
            "base-url" => self.base_url = None,
            "model" => self.model = None,
            "memory-file" => self.memory_file = None,
            "autoreply" => self.autoreply = None,
            "greeting" => self.greeting = None,
            "system-instruction" => self.system_instruction = None,
            _ => return Err(ConfigKeyError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "gemchat", "gemchat")
}

/// Snapshot location when none is configured. Falls back to the working
/// directory when the platform has no data directory.
pub fn default_memory_file_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(SNAPSHOT_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(SNAPSHOT_FILE_NAME))
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
