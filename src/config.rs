use crate::app_dirs::AppDirs;
use crate::problem::Difficulty;
use crate::session::{SessionConfig, SessionLength};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const MAX_QUESTIONS: u32 = 200;
pub const MAX_MINUTES: u32 = 60;

/// User preferences, remembered between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub category: String,
    /// Allowed units per category; a missing or empty entry means all units.
    pub units: BTreeMap<String, Vec<String>>,
    pub difficulty: Difficulty,
    pub timed: bool,
    pub question_count: u32,
    pub minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            category: "length".to_string(),
            units: BTreeMap::new(),
            difficulty: Difficulty::Mixed,
            timed: false,
            question_count: 20,
            minutes: 2,
        }
    }
}

impl Config {
    pub fn allowed_units(&self) -> Vec<String> {
        self.units.get(&self.category).cloned().unwrap_or_default()
    }

    pub fn session_length(&self) -> SessionLength {
        if self.timed {
            SessionLength::minutes(self.minutes)
        } else {
            SessionLength::Count(self.question_count)
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.category.clone(), self.session_length())
            .with_units(&self.allowed_units())
            .with_difficulty(self.difficulty)
    }

    /// Grow or shrink the active session length, staying within limits.
    pub fn adjust_length(&mut self, delta: i32) {
        let (value, max) = if self.timed {
            (&mut self.minutes, MAX_MINUTES)
        } else {
            (&mut self.question_count, MAX_QUESTIONS)
        };
        *value = value.saturating_add_signed(delta).clamp(1, max);
    }

    /// Flip one unit in or out of the current category's allowed set.
    pub fn toggle_unit(&mut self, unit: &str, category_units: &[&str]) {
        let allowed = self.units.entry(self.category.clone()).or_default();
        if allowed.is_empty() {
            allowed.extend(category_units.iter().map(|u| u.to_string()));
        }
        if let Some(pos) = allowed.iter().position(|u| u == unit) {
            allowed.remove(pos);
        } else {
            allowed.push(unit.to_string());
        }
        // keep catalog order so the settings list reads naturally
        allowed.sort_by_key(|u| category_units.iter().position(|c| *c == u.as_str()));
    }

    pub fn unit_enabled(&self, unit: &str) -> bool {
        match self.units.get(&self.category) {
            Some(allowed) if !allowed.is_empty() => allowed.iter().any(|u| u == unit),
            _ => true,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable config");
            Config::default()
        })
    }

    fn save(&self, cfg: &Config) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let mut cfg = Config {
            category: "mass".into(),
            difficulty: Difficulty::Decimals,
            timed: true,
            minutes: 5,
            ..Config::default()
        };
        cfg.units.insert("mass".into(), vec!["g".into(), "kg".into()]);
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_or_corrupt_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());

        std::fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, br#"{"category": "volume"}"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.category, "volume");
        assert_eq!(cfg.question_count, 20);
    }

    #[test]
    fn session_config_follows_mode() {
        let mut cfg = Config::default();
        assert_eq!(cfg.session_length(), SessionLength::Count(20));
        cfg.timed = true;
        assert_eq!(cfg.session_length(), SessionLength::Timed { secs: 120 });

        cfg.units.insert("length".into(), vec!["m".into(), "km".into()]);
        let session = cfg.session_config();
        assert_eq!(session.category, "length");
        assert_eq!(session.allowed_units, ["m", "km"]);
    }

    #[test]
    fn adjust_length_is_clamped() {
        let mut cfg = Config::default();
        cfg.adjust_length(-100);
        assert_eq!(cfg.question_count, 1);
        cfg.adjust_length(1000);
        assert_eq!(cfg.question_count, MAX_QUESTIONS);

        cfg.timed = true;
        cfg.adjust_length(3);
        assert_eq!(cfg.minutes, 5);
        cfg.adjust_length(100);
        assert_eq!(cfg.minutes, MAX_MINUTES);
    }

    #[test]
    fn toggle_unit_starts_from_all_units() {
        let all = ["mm", "cm", "dm", "m", "km"];
        let mut cfg = Config::default();
        assert!(cfg.unit_enabled("cm"));

        cfg.toggle_unit("cm", &all);
        assert!(!cfg.unit_enabled("cm"));
        assert_eq!(cfg.allowed_units(), ["mm", "dm", "m", "km"]);

        cfg.toggle_unit("cm", &all);
        assert_eq!(cfg.allowed_units(), all);
    }
}
