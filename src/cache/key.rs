//! Cache keys and on-disk entry paths
//!
//! An entry for `{tool, version, arch}` lives at
//! `<root>/<tool>/<version>/<arch>` with a zero-byte sibling marker
//! `<root>/<tool>/<version>/<arch>.complete` written once the entry is whole.

use crate::cache::lock::LOCK_DIR;
use crate::error::{ToolCacheError, ToolCacheResult};
use crate::platform::{host_arch, ArchNaming};
use crate::version::clean_version;
use std::path::{Component, Path, PathBuf};

/// Suffix of the completion marker next to each entry directory
pub const COMPLETE_MARKER_SUFFIX: &str = ".complete";

/// Options identifying what to cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// Tool name (first path segment under the cache root)
    pub tool: String,
    /// Exact version to store under; a leading `=v` is stripped
    pub version: String,
    /// Architecture; defaults to the host architecture
    pub arch: Option<String>,
    /// Naming scheme used for the default architecture; `Node` when unset
    pub arch_naming: Option<ArchNaming>,
}

impl CacheOptions {
    /// Options for a tool version on the host architecture
    pub fn new(tool: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Set an explicit architecture
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// Set the naming scheme for the default architecture
    pub fn with_arch_naming(mut self, naming: ArchNaming) -> Self {
        self.arch_naming = Some(naming);
        self
    }
}

/// Validated `{tool, version, arch}` triple
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub tool: String,
    pub version: String,
    pub arch: String,
}

impl CacheKey {
    /// Validate options and fill in defaults
    pub fn from_options(options: &CacheOptions) -> ToolCacheResult<Self> {
        if options.tool.is_empty() {
            return Err(ToolCacheError::Configuration(
                "missing tool name to cache".to_string(),
            ));
        }
        if options.version.is_empty() {
            return Err(ToolCacheError::Configuration(format!(
                "missing version to cache for {}",
                options.tool
            )));
        }

        let version = clean_version(&options.version);
        let arch = match options.arch.as_deref() {
            Some(arch) if !arch.is_empty() => arch,
            _ => host_arch(options.arch_naming.unwrap_or_default()),
        };

        ensure_segment("tool", &options.tool)?;
        if options.tool == LOCK_DIR {
            return Err(ToolCacheError::Configuration(format!(
                "tool name '{}' is reserved",
                LOCK_DIR
            )));
        }
        ensure_segment("version", version)?;
        ensure_segment("arch", arch)?;

        Ok(Self {
            tool: options.tool.clone(),
            version: version.to_string(),
            arch: arch.to_string(),
        })
    }

    /// Directory holding the entry's files
    pub fn entry_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.tool).join(&self.version).join(&self.arch)
    }

    /// Zero-byte marker written once the entry is complete
    pub fn marker_path(&self, root: &Path) -> PathBuf {
        marker_for(&self.entry_dir(root))
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{} ({})", self.tool, self.version, self.arch)
    }
}

/// Marker path for an entry directory
pub fn marker_for(entry_dir: &Path) -> PathBuf {
    let mut marker = entry_dir.as_os_str().to_os_string();
    marker.push(COMPLETE_MARKER_SUFFIX);
    PathBuf::from(marker)
}

/// Whether an entry directory exists and carries its completion marker
pub fn is_complete(entry_dir: &Path) -> bool {
    entry_dir.is_dir() && marker_for(entry_dir).is_file()
}

/// Reject key components that would not map to exactly one path segment
pub(crate) fn ensure_segment(field: &str, value: &str) -> ToolCacheResult<()> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(segment)), None)
            if segment == value && !value.contains(['/', '\\']) =>
        {
            Ok(())
        }
        _ => Err(ToolCacheError::Configuration(format!(
            "{} '{}' must be a single path segment",
            field, value
        ))),
    }
}

/// Drop leading `..`, `.` and root components so the subpath stays inside
/// the entry directory
pub fn sanitize_subpath(target: &str) -> PathBuf {
    let mut sanitized = PathBuf::new();
    let mut leading = true;
    for component in Path::new(target).components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir if leading => {}
            Component::ParentDir => {
                // An inner `..` could still climb back out; pop instead
                sanitized.pop();
            }
            Component::Normal(segment) => {
                leading = false;
                sanitized.push(segment);
            }
        }
    }
    sanitized
}
