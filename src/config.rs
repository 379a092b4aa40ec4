use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::session::{Mode, SessionConfig, TimeLimit};

/// Settings remembered between runs
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub username: Option<String>,
    pub mode: Mode,
    pub time_limit: TimeLimit,
}

impl Config {
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            mode: self.mode,
            time_limit: self.time_limit,
        }
    }

    pub fn with_session(mut self, session: SessionConfig) -> Self {
        self.mode = session.mode;
        self.time_limit = session.time_limit;
        self
    }
}

/// Trim, lowercase and cap a username at 15 characters. `None` when nothing
/// is left.
pub fn normalize_username(raw: &str) -> Option<String> {
    let name: String = raw.trim().to_lowercase().chars().take(MAX_USERNAME_LEN).collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

pub const MAX_USERNAME_LEN: usize = 15;

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
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

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unreadable files give the defaults
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice::<Config>(&bytes).unwrap_or_else(|err| {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring unreadable config");
                Config::default()
            }),
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
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
        let cfg = Config {
            username: Some("kb_warrior".into()),
            mode: Mode::Competition,
            time_limit: TimeLimit::try_from(120).unwrap(),
        };

        store.save(&cfg).unwrap();

        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));

        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn invalid_time_limit_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"mode":"casual","time_limit":45}"#).unwrap();

        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"mode":"competition"}"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.mode, Mode::Competition);
        assert_eq!(cfg.time_limit, TimeLimit::default());
        assert_eq!(cfg.username, None);
    }

    #[test]
    fn session_roundtrip() {
        let session = SessionConfig {
            mode: Mode::Competition,
            time_limit: TimeLimit::try_from(15).unwrap(),
        };
        let cfg = Config::default().with_session(session);
        assert_eq!(cfg.session(), session);
    }

    #[test]
    fn username_normalization() {
        assert_eq!(normalize_username("  Speed_Demon "), Some("speed_demon".into()));
        assert_eq!(normalize_username("   "), None);
        assert_eq!(
            normalize_username("averyveryverylongname").map(|n| n.len()),
            Some(MAX_USERNAME_LEN)
        );
    }
}
