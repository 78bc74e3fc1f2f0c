//! On-disk dashboard config: `<home>/.galactic_cic/config.json`. Only the
//! two fields the Renderer Contract's "theme persisted on quit" and
//! "refresh rate" behaviors need; everything else about a run (which verb,
//! which database path) is a CLI argument, not persisted state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::view::theme::ThemeName;

const DEFAULT_REFRESH_INTERVAL_SECS: f64 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: f64,
}

fn default_theme() -> String {
    ThemeName::Phosphor.as_str().to_string()
}

fn default_refresh_interval() -> f64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            theme: default_theme(),
            refresh_interval: default_refresh_interval(),
        }
    }
}

impl Config {
    /// Loads `path`, falling back to defaults if the file is absent. A
    /// present-but-corrupt file is a hard error: silently discarding a
    /// config the user can see on disk is more surprising than failing.
    pub fn load(path: &Path) -> Result<Config> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(self).context("serializing config")?;
        std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
    }

    pub fn theme(&self) -> ThemeName {
        ThemeName::from_str(&self.theme)
    }

    pub fn set_theme(&mut self, theme: ThemeName) {
        self.theme = theme.as_str().to_string();
    }
}

/// `<home>/.galactic_cic`, the directory holding the database, config,
/// collector log, and PID file.
pub fn home_dir() -> Result<PathBuf> {
    let home = dirs_home().context("could not determine home directory")?;
    Ok(home.join(".galactic_cic"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(home_dir()?.join("config.json"))
}

pub fn database_path() -> Result<PathBuf> {
    Ok(home_dir()?.join("metrics.db"))
}

pub fn log_path() -> Result<PathBuf> {
    Ok(home_dir()?.join("collector.log"))
}

pub fn pid_path() -> Result<PathBuf> {
    Ok(home_dir()?.join("daemon.pid"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut cfg = Config::default();
        cfg.set_theme(ThemeName::Amber);
        cfg.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.theme, "amber");
        assert_eq!(loaded.theme(), ThemeName::Amber);
    }

    #[test]
    fn test_corrupt_file_is_an_error_not_silently_defaulted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
