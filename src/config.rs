use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FlashbackConfig {
    pub slack: SlackConfig,
    pub storage: StorageConfig,
    pub sync: SyncConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SlackConfig {
    /// Bot token (`xoxb-...`) for Web API calls.
    pub bot_token: String,
    /// App-level token (`xapp-...`) for the Socket Mode connection.
    pub app_token: String,
    /// Display name the bot registered under; used to find its own user id.
    pub bot_name: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SyncConfig {
    /// Messages requested per history page.
    pub page_size: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for FlashbackConfig {
    fn default() -> Self {
        Self {
            slack: SlackConfig::default(),
            storage: StorageConfig::default(),
            sync: SyncConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            app_token: String::new(),
            bot_name: "flashback".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_flashback_dir()
            .join("flashback.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { page_size: 100 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}

/// Returns `~/.flashback/`
pub fn default_flashback_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".flashback")
}

/// Returns the default config file path: `~/.flashback/config.toml`
pub fn default_config_path() -> PathBuf {
    default_flashback_dir().join("config.toml")
}

impl FlashbackConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            FlashbackConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (FLASHBACK_TOKEN, FLASHBACK_APP_TOKEN,
    /// FLASHBACK_BOT_NAME, FLASHBACK_DB, FLASHBACK_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FLASHBACK_TOKEN") {
            self.slack.bot_token = val;
        }
        if let Ok(val) = std::env::var("FLASHBACK_APP_TOKEN") {
            self.slack.app_token = val;
        }
        if let Ok(val) = std::env::var("FLASHBACK_BOT_NAME") {
            self.slack.bot_name = val;
        }
        if let Ok(val) = std::env::var("FLASHBACK_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("FLASHBACK_LOG_LEVEL") {
            self.log.level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
