use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
///
/// Loaded from the config file with per-field defaults, so a partial or
/// missing file always yields a working configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub ui: UiConfig,
    pub reminders: ReminderConfig,
}

impl Config {
    /// Load config from the default location, falling back to defaults if
    /// no file exists yet.
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::Config(format!("failed to parse config: {e}")))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("failed to serialize config: {e}")))?;

        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Where the item database lives: the configured override, or
    /// `<data dir>/larder/larder.db`.
    pub fn database_path(&self) -> crate::Result<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| crate::Error::Config("could not find data directory".into()))?
            .join("larder");
        Ok(data_dir.join("larder.db"))
    }

    /// Config file path: XDG on Linux/macOS, AppData on Windows.
    fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::Config("could not find config directory".into()))?
            .join("larder");
        Ok(config_dir.join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Override for the database file location
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// UI theme name (Dark, Light)
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Enable mouse support in the TUI
    #[serde(default = "default_mouse")]
    pub mouse_enabled: bool,
}

fn default_theme() -> String {
    "Dark".to_string() // because who uses light theme in a terminal?
}

fn default_mouse() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            mouse_enabled: default_mouse(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Run the expiry check automatically shortly after startup
    #[serde(default = "default_startup_check")]
    pub startup_check: bool,

    /// How long after startup the one-shot check fires
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,
}

fn default_startup_check() -> bool {
    true
}

fn default_startup_delay_ms() -> u64 {
    1000
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            startup_check: default_startup_check(),
            startup_delay_ms: default_startup_delay_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.ui.theme, "Dark");
        assert!(config.ui.mouse_enabled);
        assert!(config.reminders.startup_check);
        assert_eq!(config.reminders.startup_delay_ms, 1000);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("theme"));
        assert!(toml.contains("startup_check"));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config = toml::from_str("[ui]\ntheme = \"Light\"\n").unwrap();
        assert_eq!(config.ui.theme, "Light");
        assert!(config.ui.mouse_enabled);
        assert!(config.reminders.startup_check);
    }
}
