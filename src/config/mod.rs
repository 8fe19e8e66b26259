use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides the configuration directory (used by tests and packaging).
pub const CONFIG_DIR_ENV: &str = "ITLAB_SYNC_HOME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: String,
    pub base_url: String,
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub page_size: u32,
    pub max_concurrent_requests: usize,
    pub worker_threads: usize,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            base_url: "https://dev.manage.rtuitlab.dev".to_string(),
            access_token: None,
            user_id: None,
            page_size: 10,
            max_concurrent_requests: 4,
            worker_threads: 2,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory
    pub fn config_dir() -> PathBuf {
        if let Ok(dir) = env::var(CONFIG_DIR_ENV)
            && !dir.trim().is_empty()
        {
            return expand_tilde(&dir);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".itlab-sync")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("itlab-sync.conf")
    }

    /// Return the default path of the SQLite cache
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("itlab-sync.sqlite")
    }

    /// Load configuration from file, or return defaults if not found.
    /// Keys missing from the file take their default value.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&Self::config_file())
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self).map_err(|_| AppError::ConfigSave)?;
        let mut file = fs::File::create(path).map_err(|_| AppError::ConfigSave)?;
        file.write_all(yaml.as_bytes())?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Problems that would prevent syncing; empty when the file is usable.
    pub fn problems(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.database.trim().is_empty() {
            out.push("database path is empty".to_string());
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            out.push(format!("base_url '{}' is not an http(s) URL", self.base_url));
        }
        if self.page_size == 0 {
            out.push("page_size must be at least 1".to_string());
        }
        if self.max_concurrent_requests == 0 {
            out.push("max_concurrent_requests must be at least 1".to_string());
        }
        if self.worker_threads == 0 {
            out.push("worker_threads must be at least 1".to_string());
        }
        if self.access_token.is_none() {
            out.push("access_token is not set, the server will reject requests".to_string());
        }
        out
    }

    /// Create the configuration directory and file, returning the config
    /// that was written. `custom_db` may be absolute or relative to the
    /// configuration directory.
    pub fn init_all(custom_db: Option<String>) -> AppResult<Self> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => {
                let p = expand_tilde(&name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        // Keep an existing file's settings, only the database moves.
        let mut config = Self::load()?;
        config.database = db_path.to_string_lossy().to_string();
        config.save()?;

        Ok(config)
    }
}
