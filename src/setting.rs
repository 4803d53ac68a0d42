//! Global settings of finstats.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{LazyLock, RwLock};

use crate::error::{Result, StatsError};
use crate::stats::Period;
use crate::utility::get_file_path;

/// Setting filename
pub const SETTING_FILENAME: &str = "finstats_setting.json";

/// Default number of records fetched per symbol
pub const DEFAULT_LENGTH: i64 = 1023;

/// Default settings
fn default_settings() -> HashMap<String, SettingValue> {
    let mut settings = HashMap::new();

    // Log settings
    settings.insert("log.active".to_string(), SettingValue::Bool(true));
    settings.insert("log.level".to_string(), SettingValue::Int(20)); // INFO level
    settings.insert("log.console".to_string(), SettingValue::Bool(true));
    settings.insert("log.file".to_string(), SettingValue::Bool(false));

    // Datafeed settings
    settings.insert("datafeed.name".to_string(), SettingValue::String("json".to_string()));
    settings.insert("datafeed.path".to_string(), SettingValue::String("data".to_string()));

    // Calculation defaults
    settings.insert("stats.risk_free".to_string(), SettingValue::Float(0.0));
    settings.insert("stats.period".to_string(), SettingValue::String(Period::Daily.to_string()));
    settings.insert("stats.length".to_string(), SettingValue::Int(DEFAULT_LENGTH));

    settings
}

/// Setting value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl SettingValue {
    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            SettingValue::Float(f) => Some(*f),
            SettingValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Settings container
pub struct Settings {
    settings: RwLock<HashMap<String, SettingValue>>,
}

impl Settings {
    /// Defaults overridden by the settings file in the working folder, if any
    pub fn new() -> Self {
        let settings = Self::defaults();
        let filepath = get_file_path(SETTING_FILENAME);
        if filepath.exists() {
            match load_settings_from_file(&filepath) {
                Ok(file_settings) => settings.update(file_settings),
                Err(e) => tracing::warn!("ignoring unreadable {}: {}", filepath.display(), e),
            }
        }
        settings
    }

    /// Built-in defaults only
    pub fn defaults() -> Self {
        Self {
            settings: RwLock::new(default_settings()),
        }
    }

    /// Defaults overridden by an explicit settings file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings = Self::defaults();
        settings.update(load_settings_from_file(path.as_ref())?);
        Ok(settings)
    }

    /// Get a setting value
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        self.settings.read().ok()?.get(key).cloned()
    }

    /// Get a string setting
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(|s| s.to_string()))
    }

    /// Get an integer setting
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_int())
    }

    /// Get a float setting
    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_float())
    }

    /// Get a bool setting
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// Period configured under `stats.period`; a bad label is an error
    pub fn period(&self) -> Result<Period> {
        match self.get_string("stats.period") {
            Some(label) => label.parse(),
            None => Ok(Period::default()),
        }
    }

    /// Risk-free rate configured under `stats.risk_free`
    pub fn risk_free(&self) -> f64 {
        self.get_float("stats.risk_free").unwrap_or(0.0)
    }

    /// Record count configured under `stats.length`; negative values are rejected
    pub fn length(&self) -> Result<usize> {
        let length = self.get_int("stats.length").unwrap_or(DEFAULT_LENGTH);
        usize::try_from(length)
            .map_err(|_| StatsError::Setting(format!("stats.length must not be negative, got {length}")))
    }

    /// Set a setting value
    pub fn set(&self, key: impl Into<String>, value: SettingValue) {
        if let Ok(mut settings) = self.settings.write() {
            settings.insert(key.into(), value);
        }
    }

    /// Update settings from a map
    pub fn update(&self, new_settings: HashMap<String, SettingValue>) {
        if let Ok(mut settings) = self.settings.write() {
            for (key, value) in new_settings {
                settings.insert(key, value);
            }
        }
    }

    /// Get all settings as HashMap
    pub fn get_all(&self) -> HashMap<String, SettingValue> {
        self.settings
            .read()
            .map(|settings| settings.clone())
            .unwrap_or_default()
    }

    /// Save settings to the working folder
    pub fn save(&self) -> Result<()> {
        self.save_to(get_file_path(SETTING_FILENAME))
    }

    /// Save settings to an explicit path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let settings = self
            .settings
            .read()
            .map_err(|e| StatsError::Setting(e.to_string()))?;
        let json = serde_json::to_string_pretty(&*settings)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Load settings from JSON file
fn load_settings_from_file(path: &Path) -> Result<HashMap<String, SettingValue>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Global settings instance
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new);
