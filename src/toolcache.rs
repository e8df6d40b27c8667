//! The tool cache service
//!
//! `ToolCache` ties the cache writer, the version resolver and the
//! downloader to one explicit set of settings.
//!
//! ```rust,ignore
//! use toolcache::{CacheOptions, DownloadOptions, ToolCache, ToolCacheSettings};
//!
//! let cache = ToolCache::new(ToolCacheSettings::new("/opt/toolcache", "/tmp/dl"));
//! let path = cache.get_cached_tool_or_download(
//!     &CacheOptions::new("jq", "1.7.1"),
//!     &DownloadOptions::default().with_permissions(0o755),
//!     "https://example.com/jq-1.7.1",
//! )?;
//! ```

use crate::cache::{self, CacheOptions, VersionQuery, WriterSettings};
use crate::config::ToolCacheSettings;
use crate::download::{DownloadOptions, Downloader};
use crate::error::ToolCacheResult;
use crate::platform::host_arch;
use crate::version::{clean_version, ToolVersion};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Tool cache bound to one cache root and download directory
#[derive(Clone)]
pub struct ToolCache {
    settings: ToolCacheSettings,
    downloader: Downloader,
}

impl ToolCache {
    /// Create a tool cache from resolved settings
    pub fn new(settings: ToolCacheSettings) -> Self {
        let downloader = Downloader::new(settings.temp_dir.clone(), settings.user_agent.clone());
        Self {
            settings,
            downloader,
        }
    }

    /// The settings this cache was built with
    pub fn settings(&self) -> &ToolCacheSettings {
        &self.settings
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.settings.cache_root
    }

    fn writer(&self) -> WriterSettings<'_> {
        WriterSettings {
            root: &self.settings.cache_root,
            lock_timeout: self.settings.lock_timeout,
        }
    }

    /// Fill in the configured naming scheme unless the caller picked one
    fn with_defaults(&self, options: &CacheOptions) -> CacheOptions {
        let mut options = options.clone();
        options.arch_naming.get_or_insert(self.settings.arch_naming);
        options
    }

    /// Cache a single file as `target` inside the entry for `options`
    pub fn cache_file(
        &self,
        source: &Path,
        target: &str,
        options: &CacheOptions,
    ) -> ToolCacheResult<PathBuf> {
        cache::cache_file(&self.writer(), source, target, &self.with_defaults(options))
    }

    /// Cache the contents of `source` at the root of the entry for `options`
    pub fn cache_directory(&self, source: &Path, options: &CacheOptions) -> ToolCacheResult<PathBuf> {
        cache::cache_directory(&self.writer(), source, &self.with_defaults(options))
    }

    /// List cached versions of a tool, optionally for one architecture
    pub fn list_cached_versions(&self, tool: &str, arch: Option<&str>) -> Vec<String> {
        let mut query = VersionQuery::new(tool, "");
        query.arch = arch.map(str::to_string);
        cache::list_cached_versions(self.root(), &query)
    }

    /// Path of the highest complete entry satisfying `query`
    pub fn find_version(&self, query: &VersionQuery) -> ToolCacheResult<PathBuf> {
        cache::find_version(self.root(), query, host_arch(self.settings.arch_naming))
    }

    /// Download `url` to a new file
    pub fn download_tool(&self, url: &str, options: &DownloadOptions) -> ToolCacheResult<PathBuf> {
        self.downloader.download(url, options)
    }

    /// Return a cached tool binary, or download it and cache it
    ///
    /// A cache hit resolves to `<entry>/<tool>`: the cached artifact must be
    /// stored under the tool's own name. On a miss the download's path is
    /// returned whether or not it could be cached.
    ///
    /// Only exact versions are written to the cache. A range such as `~1.2`
    /// is resolved against the cache, but a download made for it is returned
    /// uncached, so the next call with the same range downloads again.
    pub fn get_cached_tool_or_download(
        &self,
        options: &CacheOptions,
        download: &DownloadOptions,
        url: &str,
    ) -> ToolCacheResult<PathBuf> {
        // Resolve against the same architecture a miss would be cached under
        let options = self.with_defaults(options);
        let arch = match options.arch.as_deref() {
            Some(arch) if !arch.is_empty() => arch.to_string(),
            _ => host_arch(options.arch_naming.unwrap_or_default()).to_string(),
        };
        let query = VersionQuery::new(&options.tool, &options.version).with_arch(arch);

        match self.find_version(&query) {
            Ok(entry) => {
                let artifact = entry.join(&options.tool);
                if artifact.is_file() {
                    debug!("Using cached {}", artifact.display());
                    return Ok(artifact);
                }
                warn!(
                    "Cached entry {} has no file named {}, downloading again",
                    entry.display(),
                    options.tool
                );
            }
            Err(e) if e.is_not_found() => debug!("{}", e),
            Err(e) => return Err(e),
        }

        let path = self.download_tool(url, download)?;
        info!("Downloaded {} to {}", options.tool, path.display());

        let version = clean_version(&options.version);
        if let Err(e) = ToolVersion::parse(version) {
            warn!(
                "Not caching {}: '{}' is not an exact version ({})",
                options.tool, options.version, e
            );
            return Ok(path);
        }

        match self.cache_file(&path, &options.tool, &options) {
            Ok(entry) => debug!("Cached {} in {}", options.tool, entry.display()),
            Err(e) => warn!("Failed to cache downloaded file {}: {}", path.display(), e),
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::marker_for;
    use crate::download::test_server::{closed_url, serve};
    use crate::error::ToolCacheError;
    use crate::platform::ArchNaming;
    use std::fs;
    use tempfile::TempDir;

    fn tool_cache(dir: &TempDir) -> ToolCache {
        ToolCache::new(ToolCacheSettings::new(
            dir.path().join("cache"),
            dir.path().join("temp"),
        ))
    }

    #[test]
    fn cold_then_warm_cache() {
        let dir = TempDir::new().unwrap();
        let tc = tool_cache(&dir);
        let options = CacheOptions::new("my-tool", "1.0.1");
        let url = serve(200, b"hello-world", 1);

        let downloaded = tc
            .get_cached_tool_or_download(&options, &DownloadOptions::default(), &url)
            .unwrap();
        assert!(downloaded.starts_with(dir.path().join("temp")));
        assert_eq!(fs::read(&downloaded).unwrap(), b"hello-world");

        // The server is gone; a second call must come from the cache
        let cached = tc
            .get_cached_tool_or_download(&options, &DownloadOptions::default(), &closed_url())
            .unwrap();
        let arch = host_arch(tc.settings().arch_naming);
        assert_eq!(
            cached,
            dir.path().join("cache/my-tool/1.0.1").join(arch).join("my-tool")
        );
        assert_eq!(fs::read(&cached).unwrap(), b"hello-world");
    }

    #[test]
    fn cache_write_failure_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        // A regular file where the cache root should be makes every write fail
        let blocked_root = dir.path().join("not-a-dir");
        fs::write(&blocked_root, b"").unwrap();
        let tc = ToolCache::new(ToolCacheSettings::new(&blocked_root, dir.path().join("temp")));
        let url = serve(200, b"bin", 1);

        let path = tc
            .get_cached_tool_or_download(
                &CacheOptions::new("my-tool", "2.0.0"),
                &DownloadOptions::default(),
                &url,
            )
            .unwrap();

        assert!(path.starts_with(dir.path().join("temp")));
        assert_eq!(fs::read(&path).unwrap(), b"bin");
    }

    #[test]
    fn download_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let tc = tool_cache(&dir);
        let url = serve(404, b"", 1);

        let err = tc
            .get_cached_tool_or_download(
                &CacheOptions::new("my-tool", "1.0.0"),
                &DownloadOptions::default(),
                &url,
            )
            .unwrap_err();
        assert!(matches!(err, ToolCacheError::DownloadStatus { status: 404, .. }));
    }

    #[test]
    fn range_request_downloads_without_caching() {
        let dir = TempDir::new().unwrap();
        let tc = tool_cache(&dir);
        let url = serve(200, b"bin", 1);

        let path = tc
            .get_cached_tool_or_download(
                &CacheOptions::new("my-tool", "~1.2"),
                &DownloadOptions::default(),
                &url,
            )
            .unwrap();

        assert!(path.is_file());
        assert!(tc.list_cached_versions("my-tool", None).is_empty());
    }

    #[test]
    fn invalid_constraint_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = tool_cache(&dir)
            .get_cached_tool_or_download(
                &CacheOptions::new("my-tool", ">>1"),
                &DownloadOptions::default(),
                &closed_url(),
            )
            .unwrap_err();
        assert!(matches!(err, ToolCacheError::VersionParse { .. }));
    }

    #[test]
    fn hit_without_tool_named_file_downloads_again() {
        let dir = TempDir::new().unwrap();
        let tc = tool_cache(&dir);
        let arch = host_arch(tc.settings().arch_naming);
        let entry = dir.path().join("cache/my-tool/1.0.0").join(arch);
        fs::create_dir_all(&entry).unwrap();
        fs::write(entry.join("other-name"), b"x").unwrap();
        fs::write(marker_for(&entry), b"").unwrap();
        let url = serve(200, b"fresh", 1);

        let path = tc
            .get_cached_tool_or_download(
                &CacheOptions::new("my-tool", "1.0.0"),
                &DownloadOptions::default(),
                &url,
            )
            .unwrap();

        assert!(path.starts_with(dir.path().join("temp")));
        assert_eq!(fs::read(entry.join("my-tool")).unwrap(), b"fresh");
    }

    #[test]
    fn per_call_naming_overrides_settings() {
        let dir = TempDir::new().unwrap();
        let tc = tool_cache(&dir);
        assert_eq!(tc.settings().arch_naming, ArchNaming::Node);
        let source = dir.path().join("t");
        fs::write(&source, b"native").unwrap();

        let options = CacheOptions::new("t", "1.0.0").with_arch_naming(ArchNaming::Native);
        let entry = tc.cache_file(&source, "t", &options).unwrap();
        assert_eq!(
            entry,
            dir.path().join("cache/t/1.0.0").join(host_arch(ArchNaming::Native))
        );

        // The orchestrator looks up the same per-call naming
        let cached = tc
            .get_cached_tool_or_download(&options, &DownloadOptions::default(), &closed_url())
            .unwrap();
        assert_eq!(cached, entry.join("t"));
    }

    #[test]
    fn cache_uses_configured_naming() {
        let dir = TempDir::new().unwrap();
        let settings = ToolCacheSettings::new(dir.path().join("cache"), dir.path().join("temp"))
            .with_arch_naming(ArchNaming::Native);
        let tc = ToolCache::new(settings);
        let source = dir.path().join("bin");
        fs::write(&source, b"b").unwrap();

        let entry = tc
            .cache_file(&source, "bin", &CacheOptions::new("t", "1.0.0"))
            .unwrap();
        assert!(entry.ends_with(host_arch(ArchNaming::Native)));

        let found = tc.find_version(&VersionQuery::new("t", "1")).unwrap();
        assert_eq!(found, entry);
    }
}
