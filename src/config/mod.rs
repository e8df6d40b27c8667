//! Configuration management for toolcache

pub mod schema;

pub use schema::Config;

use crate::error::{ToolCacheError, ToolCacheResult};
use crate::platform::ArchNaming;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable overriding the default cache root
pub const ENV_TOOL_CACHE: &str = "RUNNER_TOOL_CACHE";

/// Environment variable overriding the default download directory
pub const ENV_TEMP: &str = "RUNNER_TEMP";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("toolcache")
            .join("config.toml")
    }

    /// Load configuration, using defaults if the file does not exist
    pub fn load(&self) -> ToolCacheResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&self, path: &Path) -> ToolCacheResult<Config> {
        let content = fs::read_to_string(path).map_err(|e| {
            ToolCacheError::io(format!("reading config from {}", path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| ToolCacheError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> ToolCacheResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ToolCacheError::io(format!("creating config directory {}", parent.display()), e)
            })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).map_err(|e| {
            ToolCacheError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Fully resolved settings for a `ToolCache` instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCacheSettings {
    /// Absolute cache root
    pub cache_root: PathBuf,
    /// Absolute directory for unnamed downloads
    pub temp_dir: PathBuf,
    /// Naming scheme for default architectures
    pub arch_naming: ArchNaming,
    /// How long a writer waits for an entry lock
    pub lock_timeout: Duration,
    /// User-Agent header for downloads
    pub user_agent: String,
}

impl ToolCacheSettings {
    /// Settings rooted at explicit directories, other values defaulted
    pub fn new(cache_root: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        let defaults = Config::default();
        Self {
            cache_root: absolutize(cache_root.into()),
            temp_dir: absolutize(temp_dir.into()),
            arch_naming: defaults.cache.arch_naming,
            lock_timeout: Duration::from_secs(defaults.cache.lock_timeout_secs),
            user_agent: defaults.download.user_agent,
        }
    }

    /// Resolve settings from configuration and the process environment
    ///
    /// Precedence for each directory: config file, then environment, then
    /// `<home>/actions/{cache,temp}`. An environment variable set to the
    /// empty string counts as unset, so it never roots the cache in the
    /// working directory.
    pub fn from_config(config: &Config) -> Self {
        Self::from_config_with_env(config, |key| std::env::var_os(key))
    }

    /// Resolve settings with an explicit environment lookup
    pub fn from_config_with_env<F>(config: &Config, env: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let base = base_location();
        let pick = |configured: &Option<PathBuf>, var: &str, fallback: &str| {
            configured
                .clone()
                .or_else(|| env(var).filter(|v| !v.is_empty()).map(PathBuf::from))
                .unwrap_or_else(|| base.join("actions").join(fallback))
        };

        Self {
            cache_root: absolutize(pick(&config.cache.root, ENV_TOOL_CACHE, "cache")),
            temp_dir: absolutize(pick(&config.cache.temp_dir, ENV_TEMP, "temp")),
            arch_naming: config.cache.arch_naming,
            lock_timeout: Duration::from_secs(config.cache.lock_timeout_secs),
            user_agent: config.download.user_agent.clone(),
        }
    }

    /// Override the cache root
    pub fn with_cache_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.cache_root = absolutize(root.into());
        self
    }

    /// Override the download directory
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = absolutize(dir.into());
        self
    }

    /// Override the architecture naming scheme
    pub fn with_arch_naming(mut self, naming: ArchNaming) -> Self {
        self.arch_naming = naming;
        self
    }
}

/// Base directory for the default cache and temp locations
fn base_location() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn absolutize(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
