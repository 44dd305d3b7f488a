//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Work and break lengths
//! - Exercise backend location and request timeout
//! - The signed-in user (enables blocking)
//! - Equipment/target filters forwarded to the backend
//! - Alarm settings
//!
//! Configuration is stored at `~/.config/movebreak/config.toml`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::data_dir;
use crate::alarm::{Alarm, SilentAlarm, TerminalBell, DEFAULT_SOUND_URL};
use crate::error::{ConfigError, CoreError};
use crate::exercises::{FilterContext, HttpExerciseClient, UserId};
use crate::session::SessionSettings;
use crate::timer::PhaseDurations;

/// Phase lengths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
}

/// Exercise backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Signed-in user. Without an id, blocking is unavailable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub id: Option<u64>,
}

/// Exercise filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Alarm configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_sound_url")]
    pub sound_url: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/movebreak/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub alarm: AlarmConfig,
}

// Default functions
fn default_work_minutes() -> u32 {
    60
}
fn default_break_minutes() -> u32 {
    5
}
fn default_base_url() -> String {
    "http://127.0.0.1:5000".into()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_true() -> bool {
    true
}
fn default_sound_url() -> String {
    DEFAULT_SOUND_URL.into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound_url: default_sound_url(),
        }
    }
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
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    // Optional numeric fields (`user.id`) serialize as null.
                    serde_json::Value::Number(_) | serde_json::Value::Null => {
                        if value.is_empty() || value == "none" {
                            serde_json::Value::Null
                        } else {
                            serde_json::Value::Number(
                                value
                                    .parse::<u64>()
                                    .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                                    .into(),
                            )
                        }
                    }
                    serde_json::Value::Array(_) => {
                        // Accept JSON arrays or a comma-separated list.
                        if value.trim_start().starts_with('[') {
                            serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                        } else {
                            serde_json::Value::Array(
                                value
                                    .split(',')
                                    .map(str::trim)
                                    .filter(|s| !s.is_empty())
                                    .map(|s| serde_json::Value::String(s.to_string()))
                                    .collect(),
                            )
                        }
                    }
                    serde_json::Value::Object(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
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
        match std::fs::read_to_string(path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key, in the same form
    /// [`Config::set`] accepts: lists comma-separated, unset values as `none`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        Self::get_json_value_by_path(&json, key).map(Self::render_value)
    }

    /// Every leaf setting as `(dot.key, value)`, rendered like [`Config::get`].
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        if let Ok(serde_json::Value::Object(sections)) = serde_json::to_value(self) {
            for (section, fields) in &sections {
                let Some(fields) = fields.as_object() else {
                    continue;
                };
                for (field, value) in fields {
                    entries.push((format!("{section}.{field}"), Self::render_value(value)));
                }
            }
        }
        entries
    }

    fn render_value(value: &serde_json::Value) -> String {
        match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "none".to_string(),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        }
    }

    /// Update a value by dot-separated key without saving. The result must
    /// still pass [`Config::validate`].
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Check values the timer and client depend on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer.work_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.work_minutes".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.timer.break_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.break_minutes".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "backend.timeout_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        self.base_url()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.backend.base_url).map_err(|e| ConfigError::InvalidValue {
            key: "backend.base_url".into(),
            message: e.to_string(),
        })
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user.id.map(UserId)
    }

    pub fn durations(&self) -> PhaseDurations {
        PhaseDurations::from_minutes(self.timer.work_minutes, self.timer.break_minutes)
    }

    pub fn filter_context(&self) -> FilterContext {
        FilterContext {
            equipment: self.filter.equipment.clone(),
            targets: self.filter.targets.clone(),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            durations: self.durations(),
            user_id: self.user_id(),
            filter: self.filter_context(),
        }
    }

    /// HTTP client for the configured backend.
    pub fn exercise_client(&self) -> Result<HttpExerciseClient, CoreError> {
        let client = HttpExerciseClient::new(
            self.base_url()?,
            Duration::from_secs(self.backend.timeout_secs),
        )?;
        Ok(client)
    }

    pub fn alarm(&self) -> Arc<dyn Alarm> {
        if self.alarm.enabled {
            Arc::new(TerminalBell::new(self.alarm.sound_url.clone()))
        } else {
            Arc::new(SilentAlarm)
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.work_minutes, 60);
        assert_eq!(parsed.alarm.sound_url, DEFAULT_SOUND_URL);
        assert!(parsed.user.id.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[timer]\nwork_minutes = 25\n").unwrap();
        assert_eq!(cfg.timer.work_minutes, 25);
        assert_eq!(cfg.timer.break_minutes, 5);
        assert_eq!(cfg.backend.timeout_secs, 10);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.work_minutes").as_deref(), Some("60"));
        assert_eq!(cfg.get("alarm.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("user.id").as_deref(), Some("none"));
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn get_renders_lists_the_way_set_reads_them() {
        let mut cfg = Config::default();
        assert_eq!(cfg.get("filter.targets").as_deref(), Some(""));
        cfg.apply("filter.targets", "abs,biceps").unwrap();
        let shown = cfg.get("filter.targets").unwrap();
        assert_eq!(shown, "abs,biceps");

        let mut copy = Config::default();
        copy.apply("filter.targets", &shown).unwrap();
        assert_eq!(copy.filter.targets, cfg.filter.targets);
    }

    #[test]
    fn entries_cover_every_section() {
        let entries = Config::default().entries();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        for key in [
            "timer.work_minutes",
            "timer.break_minutes",
            "backend.base_url",
            "backend.timeout_secs",
            "user.id",
            "filter.equipment",
            "filter.targets",
            "alarm.enabled",
            "alarm.sound_url",
        ] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert!(entries.contains(&("user.id".to_string(), "none".to_string())));
    }

    #[test]
    fn apply_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.apply("timer.break_minutes", "10").unwrap();
        assert_eq!(cfg.timer.break_minutes, 10);
    }

    #[test]
    fn apply_sets_and_clears_optional_user() {
        let mut cfg = Config::default();
        cfg.apply("user.id", "42").unwrap();
        assert_eq!(cfg.user_id(), Some(UserId(42)));
        cfg.apply("user.id", "none").unwrap();
        assert_eq!(cfg.user_id(), None);
    }

    #[test]
    fn apply_accepts_comma_separated_lists() {
        let mut cfg = Config::default();
        cfg.apply("filter.equipment", "dumbbell, body weight").unwrap();
        assert_eq!(cfg.filter.equipment, vec!["dumbbell", "body weight"]);
        cfg.apply("filter.targets", r#"["abs"]"#).unwrap();
        assert_eq!(cfg.filter_context().targets, vec!["abs"]);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.apply("timer.nonexistent", "1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        let err = cfg.apply("alarm.enabled", "not_a_bool").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(cfg.alarm.enabled);
    }

    #[test]
    fn apply_rejects_zero_minutes() {
        let mut cfg = Config::default();
        assert!(cfg.apply("timer.work_minutes", "0").is_err());
        assert_eq!(cfg.timer.work_minutes, 60);
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut cfg = Config::default();
        cfg.backend.base_url = "not a url".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn session_settings_follow_config() {
        let mut cfg = Config::default();
        cfg.timer.work_minutes = 25;
        cfg.user.id = Some(7);
        cfg.filter.targets = vec!["abs".into()];

        let settings = cfg.session_settings();
        assert_eq!(settings.durations.work_secs, 1500);
        assert_eq!(settings.durations.break_secs, 300);
        assert_eq!(settings.user_id, Some(UserId(7)));
        assert_eq!(settings.filter.targets, vec!["abs".to_string()]);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timer.work_minutes, 60);
        assert!(path.exists());

        let mut cfg = cfg;
        cfg.timer.work_minutes = 30;
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().timer.work_minutes, 30);
    }

    #[test]
    fn load_from_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = [[[").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
