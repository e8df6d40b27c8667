//! Version discovery and constraint resolution over cached entries

use crate::cache::key::{ensure_segment, is_complete};
use crate::error::{ToolCacheError, ToolCacheResult};
use crate::version::{ToolVersion, VersionConstraint};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Query for cached versions of a tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionQuery {
    /// Tool name
    pub tool: String,
    /// Version constraint (only used by `find_version`)
    pub version: String,
    /// Restrict to one architecture; any architecture when unset
    pub arch: Option<String>,
}

impl VersionQuery {
    /// Query a tool with a version constraint
    pub fn new(tool: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            version: version.into(),
            arch: None,
        }
    }

    /// Restrict the query to one architecture
    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    fn arch_filter(&self) -> Option<&str> {
        self.arch.as_deref().filter(|a| !a.is_empty())
    }
}

/// List the version directories cached for a tool
///
/// Never fails: problems are logged and yield an empty (or shorter) list.
pub fn list_cached_versions(root: &Path, query: &VersionQuery) -> Vec<String> {
    if query.tool.is_empty() {
        error!("Missing tool name to list versions");
        return Vec::new();
    }
    if let Err(e) = ensure_segment("tool", &query.tool) {
        error!("Unable to list cached versions: {}", e);
        return Vec::new();
    }
    if let Some(Err(e)) = query.arch_filter().map(|arch| ensure_segment("arch", arch)) {
        error!("Unable to list cached versions: {}", e);
        return Vec::new();
    }

    let tool_dir = root.join(&query.tool);
    let entries = match fs::read_dir(&tool_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No cache directory for {}", query.tool);
            return Vec::new();
        }
        Err(e) => {
            warn!("Unable to list cached versions in {}: {}", tool_dir.display(), e);
            return Vec::new();
        }
    };

    let mut versions = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Unable to read entry in {}: {}", tool_dir.display(), e);
                continue;
            }
        };
        let version_dir = entry.path();
        if !version_dir.is_dir() {
            continue;
        }
        let Some(version) = entry.file_name().to_str().map(str::to_string) else {
            warn!("Skipping non UTF-8 version directory {}", version_dir.display());
            continue;
        };

        let has_arch = match query.arch_filter() {
            Some(arch) => version_dir.join(arch).is_dir(),
            None => !arch_dirs(&version_dir).is_empty(),
        };
        if has_arch {
            versions.push(version);
        }
    }

    versions.sort();
    versions.dedup();
    versions
}

/// Find the highest cached version satisfying the query's constraint
///
/// Only entries carrying their completion marker count as hits. Without an
/// architecture filter, `preferred_arch` wins when it is cached, otherwise
/// the first completed architecture by name.
pub fn find_version(
    root: &Path,
    query: &VersionQuery,
    preferred_arch: &str,
) -> ToolCacheResult<PathBuf> {
    if let Some(arch) = query.arch_filter() {
        ensure_segment("arch", arch)?;
    }
    let constraint = VersionConstraint::parse(&query.version)?;

    let mut versions: Vec<ToolVersion> = list_cached_versions(root, query)
        .into_iter()
        .filter_map(|v| match ToolVersion::parse(&v) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Failed to parse cached version {}: {}", v, e);
                None
            }
        })
        .collect();
    versions.sort();

    for version in versions.iter().rev() {
        if !constraint.matches(version) {
            continue;
        }
        let version_dir = root.join(&query.tool).join(version.original());
        let hit = match query.arch_filter() {
            Some(arch) => Some(version_dir.join(arch)).filter(|dir| is_complete(dir)),
            None => complete_arch(&version_dir, preferred_arch),
        };
        match hit {
            Some(path) => {
                debug!("Resolved {} {} to {}", query.tool, constraint, path.display());
                return Ok(path);
            }
            None => debug!(
                "Skipping {} {}: no complete entry",
                query.tool,
                version.original()
            ),
        }
    }

    Err(ToolCacheError::NotFound {
        tool: query.tool.clone(),
        constraint: query.version.clone(),
    })
}

/// Architecture directories under a version directory, sorted by name
fn arch_dirs(version_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(version_dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

fn complete_arch(version_dir: &Path, preferred_arch: &str) -> Option<PathBuf> {
    let preferred = version_dir.join(preferred_arch);
    if is_complete(&preferred) {
        return Some(preferred);
    }
    arch_dirs(version_dir).into_iter().find(|dir| is_complete(dir))
}
