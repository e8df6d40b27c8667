//! Error types for toolcache
//!
//! All modules use `ToolCacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for toolcache operations
pub type ToolCacheResult<T> = Result<T, ToolCacheError>;

/// All errors that can occur in toolcache
#[derive(Error, Debug)]
pub enum ToolCacheError {
    // Option errors
    #[error("Invalid cache options: {0}")]
    Configuration(String),

    // Download errors
    #[error("Destination already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Failed to download {url}: {source}")]
    DownloadRequest {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    #[error("Failed to download {url}: unexpected status code {status}, expecting 2xx")]
    DownloadStatus { url: String, status: u16 },

    #[error("Failed to download {url}: writing {path}: {source}")]
    DownloadWrite {
        url: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Cache errors
    #[error("Failed to write cache entry: {context}: {source}")]
    CacheWrite {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid version constraint '{input}': {reason}")]
    VersionParse { input: String, reason: String },

    #[error("Could not find any cached version for {tool} matching {constraint}")]
    NotFound { tool: String, constraint: String },

    // Configuration file errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl ToolCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a cache write error with context
    pub fn cache_write(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::CacheWrite {
            context: context.into(),
            source,
        }
    }

    /// Whether no cached version satisfied the request
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Run: toolcache list <tool> to see cached versions"),
            Self::AlreadyExists(_) => Some("Remove the file or pass a different --dest"),
            Self::VersionParse { .. } => {
                Some("Use a range such as ~1.2, ^2.0.0, >=1.0 <2.0 or *")
            }
            Self::ConfigInvalid { .. } => Some("Run: toolcache config init --force"),
            _ => None,
        }
    }
}
