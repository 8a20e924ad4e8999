//! TOML-based application configuration.
//!
//! Stores:
//! - Default timer length and sampling interval
//! - Duration service endpoint and timeout
//! - Out-of-window surface sizes
//!
//! Configuration is stored at `~/.config/aura-timer/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use crate::error::ConfigError;
use crate::pip::SurfaceSizes;
use crate::render::Size;

/// Upper bound of the sampling interval. Anything coarser drifts visibly.
pub const MAX_TICK_INTERVAL_MS: u64 = 100;

/// Timer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// External text-to-duration service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationServiceConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Out-of-window surface sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipConfig {
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/aura-timer/config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub duration_service: DurationServiceConfig,
    #[serde(default)]
    pub pip: PipConfig,
}

fn default_minutes() -> u32 {
    15
}
fn default_tick_interval_ms() -> u64 {
    MAX_TICK_INTERVAL_MS
}
fn default_endpoint() -> String {
    "http://127.0.0.1:8787/api/gemini".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_window_width() -> u32 {
    340
}
fn default_window_height() -> u32 {
    200
}
fn default_canvas_width() -> u32 {
    600
}
fn default_canvas_height() -> u32 {
    340
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_minutes(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Default for DurationServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PipConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
        }
    }
}

impl TimerConfig {
    pub fn default_seconds(&self) -> u32 {
        self.default_minutes.saturating_mul(60)
    }
}

impl PipConfig {
    pub fn window_size(&self) -> Size {
        Size::new(self.window_width, self.window_height)
    }

    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas_width, self.canvas_height)
    }

    pub fn surface_sizes(&self) -> SurfaceSizes {
        SurfaceSizes {
            window: self.window_size(),
            canvas: self.canvas_size(),
        }
    }
}

/// Returns `~/.config/aura-timer[-dev]/` based on AURA_TIMER_ENV.
///
/// Set AURA_TIMER_ENV=dev to use the development directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("AURA_TIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("aura-timer-dev")
    } else {
        base_dir.join("aura-timer")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirectoryUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn collect_leaves(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
        match value {
            serde_json::Value::Object(map) => {
                for (k, v) in map {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    Self::collect_leaves(&key, v, out);
                }
            }
            serde_json::Value::String(s) => out.push((prefix.to_string(), s.clone())),
            other => out.push((prefix.to_string(), other.to_string())),
        }
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| load_failed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, writing defaults");
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(load_failed(e.to_string())),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };

        if !(1..=MAX_TICK_INTERVAL_MS).contains(&self.timer.tick_interval_ms) {
            return Err(invalid(
                "timer.tick_interval_ms",
                "must be between 1 and 100 milliseconds",
            ));
        }
        if self.timer.default_minutes == 0 {
            return Err(invalid("timer.default_minutes", "must be positive"));
        }

        let endpoint = Url::parse(&self.duration_service.endpoint)
            .map_err(|e| invalid("duration_service.endpoint", &e.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(invalid("duration_service.endpoint", "must be an http(s) URL"));
        }
        if self.duration_service.timeout_secs == 0 {
            return Err(invalid("duration_service.timeout_secs", "must be positive"));
        }

        if self.pip.window_size().is_empty() {
            return Err(invalid("pip.window_width", "window size must be non-zero"));
        }
        if self.pip.canvas_size().is_empty() {
            return Err(invalid("pip.canvas_width", "canvas size must be non-zero"));
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The result is validated
    /// before it replaces `self`; nothing is written to disk.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Every leaf as `(dot.path, value)`, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            Self::collect_leaves("", &json, &mut out);
        }
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.timer.default_minutes, 15);
        assert_eq!(parsed.timer.tick_interval_ms, 100);
    }

    #[test]
    fn partial_file_uses_field_defaults() {
        let parsed: Config = toml::from_str("[timer]\ndefault_minutes = 25\n").unwrap();
        assert_eq!(parsed.timer.default_minutes, 25);
        assert_eq!(parsed.timer.tick_interval_ms, 100);
        assert_eq!(parsed.pip.window_size(), Size::new(340, 200));
        assert_eq!(parsed.pip.canvas_size(), Size::new(600, 340));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.default_minutes").as_deref(), Some("15"));
        assert_eq!(
            cfg.get("duration_service.endpoint").as_deref(),
            Some("http://127.0.0.1:8787/api/gemini")
        );
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("timer").is_none());
    }

    #[test]
    fn set_updates_number_and_string() {
        let mut cfg = Config::default();
        cfg.set("pip.canvas_width", "800").unwrap();
        cfg.set("duration_service.endpoint", "https://timer.example/api/parse")
            .unwrap();
        assert_eq!(cfg.pip.canvas_width, 800);
        assert_eq!(cfg.duration_service.endpoint, "https://timer.example/api/parse");
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("timer", "1"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            cfg.set("timer.default_minutes", "abc"),
            Err(ConfigError::InvalidValue { .. })
        ));
        // Out of range is rejected and leaves the config untouched.
        assert!(cfg.set("timer.tick_interval_ms", "250").is_err());
        assert!(cfg.set("duration_service.endpoint", "ftp://nope").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn entries_list_every_leaf() {
        let keys: Vec<String> = Config::default().entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "duration_service.endpoint",
                "duration_service.timeout_secs",
                "pip.canvas_height",
                "pip.canvas_width",
                "pip.window_height",
                "pip.window_width",
                "timer.default_minutes",
                "timer.tick_interval_ms",
            ]
        );
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("timer.default_minutes", "45").unwrap();
        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timer.default_seconds(), 2700);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer\ndefault_minutes = ").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
