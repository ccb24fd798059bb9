use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::NamingConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Container runtime endpoint
    pub client_url: String,
    /// Environment variable whose value names the container
    pub name_from_env: Option<String>,
    pub sanitize_slashes: bool,
    pub ecs_mode: bool,
    /// Seconds between polls
    pub poll_interval: u64,
    /// Seconds a single poll may run before it is cancelled
    pub poll_timeout: u64,
    pub proc_path: PathBuf,
    /// Mount point reported as the root volume
    pub root_path: PathBuf,
    pub disk_prefix: String,
    /// Status API port; 0 disables the server
    pub port: u16,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_url: "unix:///var/run/docker.sock".to_string(),
            name_from_env: None,
            sanitize_slashes: true,
            ecs_mode: false,
            poll_interval: 10,
            poll_timeout: 8,
            proc_path: PathBuf::from("/proc"),
            root_path: PathBuf::from("/mnt/host_root"),
            disk_prefix: "ecsdisk".to_string(),
            port: 3000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the file named by `CTRSTAT_CONFIG`, then environment
    pub fn load() -> Result<Self, ConfigError> {
        let base = match env::var("CTRSTAT_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        Ok(base.with_env(|key| env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply overrides from `lookup`; unparsable values are ignored
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("DOCKER_HOST") {
            self.client_url = url;
        }
        if let Some(key) = lookup("CTRSTAT_NAME_FROM_ENV") {
            self.name_from_env = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(flag) = lookup("CTRSTAT_SANITIZE_SLASHES").and_then(|s| parse_bool(&s)) {
            self.sanitize_slashes = flag;
        }
        if let Some(flag) = lookup("CTRSTAT_ECS_MODE").and_then(|s| parse_bool(&s)) {
            self.ecs_mode = flag;
        }
        if let Some(secs) = lookup("CTRSTAT_POLL_INTERVAL").and_then(|s| s.parse().ok()) {
            self.poll_interval = secs;
        }
        if let Some(secs) = lookup("CTRSTAT_POLL_TIMEOUT").and_then(|s| s.parse().ok()) {
            self.poll_timeout = secs;
        }
        if let Some(path) = lookup("CTRSTAT_PROC_PATH") {
            self.proc_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("CTRSTAT_ROOT_PATH") {
            self.root_path = PathBuf::from(path);
        }
        if let Some(prefix) = lookup("CTRSTAT_DISK_PREFIX") {
            self.disk_prefix = prefix;
        }
        if let Some(port) = lookup("CTRSTAT_PORT").and_then(|s| s.parse().ok()) {
            self.port = port;
        }
        if let Some(level) = lookup("CTRSTAT_LOG_LEVEL") {
            self.log_level = level;
        }
        self
    }

    pub fn naming(&self) -> NamingConfig {
        NamingConfig {
            name_from_env: self.name_from_env.clone(),
            sanitize_slashes: self.sanitize_slashes,
            ecs_mode: self.ecs_mode,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval.max(1))
    }

    /// Never longer than the interval, so polls cannot overlap
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout.clamp(1, self.poll_interval.max(1)))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
