//! toolcache - Local tool cache for CI runners
//!
//! Caches tool binaries on disk by name, version and architecture, resolves
//! version ranges against what is cached, and downloads on a miss.

pub mod cache;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod platform;
pub mod toolcache;
pub mod ui;
pub mod version;

pub use cache::{CacheKey, CacheOptions, VersionQuery};
pub use config::{Config, ConfigManager, ToolCacheSettings};
pub use download::{DownloadOptions, Downloader};
pub use error::{ToolCacheError, ToolCacheResult};
pub use platform::ArchNaming;
pub use toolcache::ToolCache;
pub use version::{ToolVersion, VersionConstraint};
