//! Cache entry materialization
//!
//! Writing an entry always starts from scratch:
//!
//! 1. take the entry's writer lock
//! 2. remove the completion marker
//! 3. delete and recreate the entry directory
//! 4. copy every source file under the (sanitized) target subpath
//! 5. create the completion marker
//!
//! A failure at any step leaves the entry without a marker, which readers
//! treat as a miss.

use crate::cache::key::{sanitize_subpath, CacheKey, CacheOptions};
use crate::cache::lock::EntryLock;
use crate::cache::walk::{SourceFile, SourceFiles};
use crate::error::{ToolCacheError, ToolCacheResult};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Settings a writer needs from the cache configuration
#[derive(Debug, Clone)]
pub struct WriterSettings<'a> {
    pub root: &'a Path,
    pub lock_timeout: Duration,
}

/// Copy `source` into the entry for `options`, placing it under `target`
///
/// Returns the entry directory.
pub fn cache(
    settings: &WriterSettings<'_>,
    source: &Path,
    target: &str,
    options: &CacheOptions,
) -> ToolCacheResult<PathBuf> {
    let key = CacheKey::from_options(options)?;
    let dest_folder = key.entry_dir(settings.root);
    let marker = key.marker_path(settings.root);
    debug!("Caching {} into {}", source.display(), dest_folder.display());

    let _lock = EntryLock::acquire(settings.root, &key, settings.lock_timeout)
        .map_err(|e| ToolCacheError::cache_write(format!("locking entry {}", key), e))?;

    remove_marker(&marker)?;
    create_empty_entry(&dest_folder)?;

    let target = sanitize_subpath(target);
    let base = dest_folder.join(&target);

    let mut copied = 0usize;
    for file in SourceFiles::new(source) {
        let file = file.map_err(|e| {
            ToolCacheError::cache_write(format!("walking source {}", source.display()), e)
        })?;
        let destination = destination_for(&base, &file);
        debug!("Copying {} to {}", file.path.display(), destination.display());
        copy_file(&file.path, &destination).map_err(|e| {
            ToolCacheError::cache_write(
                format!(
                    "copying {} to {} for {}",
                    file.path.display(),
                    destination.display(),
                    key
                ),
                e,
            )
        })?;
        copied += 1;
    }

    File::create(&marker).map_err(|e| {
        ToolCacheError::cache_write(format!("marking {} complete", dest_folder.display()), e)
    })?;

    debug!("Cached {} file(s) for {}", copied, key);
    Ok(dest_folder)
}

/// Cache a single file as `target` inside the entry
pub fn cache_file(
    settings: &WriterSettings<'_>,
    source: &Path,
    target: &str,
    options: &CacheOptions,
) -> ToolCacheResult<PathBuf> {
    cache(settings, source, target, options)
}

/// Cache the contents of a directory at the root of the entry
pub fn cache_directory(
    settings: &WriterSettings<'_>,
    source: &Path,
    options: &CacheOptions,
) -> ToolCacheResult<PathBuf> {
    cache(settings, source, "", options)
}

fn destination_for(base: &Path, file: &SourceFile) -> PathBuf {
    if file.relative.as_os_str().is_empty() {
        base.to_path_buf()
    } else {
        base.join(&file.relative)
    }
}

fn remove_marker(marker: &Path) -> ToolCacheResult<()> {
    match fs::remove_file(marker) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ToolCacheError::cache_write(
            format!("removing stale marker {}", marker.display()),
            e,
        )),
    }
}

fn create_empty_entry(folder: &Path) -> ToolCacheResult<()> {
    match fs::remove_dir_all(folder) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(ToolCacheError::cache_write(
                format!("clearing {}", folder.display()),
                e,
            ))
        }
    }
    fs::create_dir_all(folder)
        .map_err(|e| ToolCacheError::cache_write(format!("creating {}", folder.display()), e))
}

/// Copy one file, keeping its permission bits
fn copy_file(source: &Path, destination: &Path) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    // fs::copy follows symlinks and carries the mode bits over
    fs::copy(source, destination)?;
    Ok(())
}
