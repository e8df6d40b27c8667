//! Configuration schema for toolcache
//!
//! Configuration is stored at `~/.config/toolcache/config.toml`

use crate::platform::ArchNaming;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache location and behavior
    pub cache: CacheConfig,

    /// Download settings
    pub download: DownloadConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root (default: $RUNNER_TOOL_CACHE, then ~/actions/cache)
    pub root: Option<PathBuf>,

    /// Download directory (default: $RUNNER_TEMP, then ~/actions/temp)
    pub temp_dir: Option<PathBuf>,

    /// Naming scheme for the default architecture: "node" or "native"
    pub arch_naming: ArchNaming,

    /// Seconds to wait for another writer of the same entry
    pub lock_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: None,
            temp_dir: None,
            arch_naming: ArchNaming::default(),
            lock_timeout_secs: 300,
        }
    }
}

/// Download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// User-Agent header sent with downloads
    pub user_agent: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("toolcache/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
