//! Tool downloads
//!
//! Streams a URL into a fresh local file. A download never overwrites an
//! existing file, has no retries and uses the transport's default timeouts.

use crate::error::{ToolCacheError, ToolCacheResult};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options for a single download
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Where to write the file; a unique name in the temp directory when unset
    pub destination: Option<PathBuf>,
    /// Unix permission bits applied after a successful download
    pub permissions: Option<u32>,
}

impl DownloadOptions {
    /// Download to an explicit destination
    pub fn to(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: Some(destination.into()),
            permissions: None,
        }
    }

    /// Apply permission bits after download
    pub fn with_permissions(mut self, mode: u32) -> Self {
        self.permissions = Some(mode);
        self
    }
}

/// Blocking HTTP downloader
#[derive(Clone)]
pub struct Downloader {
    agent: ureq::Agent,
    temp_dir: PathBuf,
    user_agent: String,
}

impl Downloader {
    /// Create a downloader writing unnamed downloads into `temp_dir`
    pub fn new(temp_dir: impl Into<PathBuf>, user_agent: impl Into<String>) -> Self {
        // Non-2xx responses are reported with their status instead of as
        // transport errors.
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            temp_dir: temp_dir.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Resolve where a download will be written
    pub fn destination(&self, options: &DownloadOptions) -> PathBuf {
        match &options.destination {
            Some(dest) if !dest.as_os_str().is_empty() => dest.clone(),
            _ => self.temp_dir.join(uuid::Uuid::new_v4().to_string()),
        }
    }

    /// Download `url` and return the path of the written file
    pub fn download(&self, url: &str, options: &DownloadOptions) -> ToolCacheResult<PathBuf> {
        let dest = self.destination(options);
        debug!("Downloading {} to {}", url, dest.display());

        ensure_parent_dir(&dest)?;
        ensure_not_exists(&dest)?;

        let response = self
            .agent
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .map_err(|e| ToolCacheError::DownloadRequest {
                url: url.to_string(),
                source: Box::new(e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolCacheError::DownloadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let write_err = |source: io::Error| ToolCacheError::DownloadWrite {
            url: url.to_string(),
            path: dest.clone(),
            source,
        };

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&dest) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(ToolCacheError::AlreadyExists(dest.clone()));
            }
            Err(e) => return Err(write_err(e)),
        };

        let mut body = response.into_body().into_reader();
        let written = io::copy(&mut body, &mut file).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        debug!("Downloaded {} bytes from {}", written, url);

        if let Some(mode) = options.permissions {
            set_permissions(&dest, mode)?;
        }

        Ok(dest)
    }
}

fn ensure_parent_dir(dest: &Path) -> ToolCacheResult<()> {
    match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|e| {
                ToolCacheError::io(
                    format!("creating destination directory {}", parent.display()),
                    e,
                )
            }),
        _ => Ok(()),
    }
}

fn ensure_not_exists(dest: &Path) -> ToolCacheResult<()> {
    match fs::symlink_metadata(dest) {
        Ok(_) => Err(ToolCacheError::AlreadyExists(dest.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ToolCacheError::io(
            format!("checking destination {}", dest.display()),
            e,
        )),
    }
}

#[cfg(unix)]
fn set_permissions(dest: &Path, mode: u32) -> ToolCacheResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(dest, fs::Permissions::from_mode(mode)).map_err(|e| {
        ToolCacheError::io(format!("setting permissions on {}", dest.display()), e)
    })
}

#[cfg(not(unix))]
fn set_permissions(dest: &Path, mode: u32) -> ToolCacheResult<()> {
    debug!("Ignoring mode {:o} for {} on this platform", mode, dest.display());
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_server::{closed_url, serve};
    use super::*;
    use tempfile::TempDir;

    fn downloader(dir: &TempDir) -> Downloader {
        Downloader::new(dir.path().join("temp"), "toolcache-test")
    }

    #[test]
    fn destination_defaults_to_uuid_in_temp_dir() {
        let dir = TempDir::new().unwrap();
        let dl = downloader(&dir);

        let dest = dl.destination(&DownloadOptions::default());
        assert_eq!(dest.parent().unwrap(), dir.path().join("temp"));
        let name = dest.file_name().unwrap().to_str().unwrap();
        assert!(uuid::Uuid::parse_str(name).is_ok());

        assert_eq!(
            dl.destination(&DownloadOptions::to("hello-world")),
            PathBuf::from("hello-world")
        );
    }

    #[test]
    fn download_writes_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let url = serve(200, b"hello-world", 1);

        let path = downloader(&dir).download(&url, &DownloadOptions::default()).unwrap();

        assert!(path.starts_with(dir.path().join("temp")));
        assert_eq!(fs::read(&path).unwrap(), b"hello-world");
    }

    #[test]
    fn download_refuses_existing_destination() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("existing");
        fs::write(&dest, b"keep me").unwrap();

        let err = downloader(&dir)
            .download(&closed_url(), &DownloadOptions::to(&dest))
            .unwrap_err();

        assert!(matches!(err, ToolCacheError::AlreadyExists(_)));
        assert_eq!(fs::read(&dest).unwrap(), b"keep me");
    }

    #[test]
    fn download_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let url = serve(200, b"data", 1);
        let dest = dir.path().join("a/b/c/tool");

        let path = downloader(&dir).download(&url, &DownloadOptions::to(&dest)).unwrap();
        assert_eq!(path, dest);
        assert_eq!(fs::read(&dest).unwrap(), b"data");
    }

    #[test]
    fn download_reports_bad_status() {
        let dir = TempDir::new().unwrap();
        let url = serve(406, b"nope", 1);

        let err = downloader(&dir).download(&url, &DownloadOptions::default()).unwrap_err();

        match err {
            ToolCacheError::DownloadStatus { status, url: reported } => {
                assert_eq!(status, 406);
                assert_eq!(reported, url);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn download_reports_connection_failure() {
        let dir = TempDir::new().unwrap();
        let err = downloader(&dir)
            .download(&closed_url(), &DownloadOptions::default())
            .unwrap_err();
        assert!(matches!(err, ToolCacheError::DownloadRequest { .. }));

        let err = downloader(&dir)
            .download("this is not a URL", &DownloadOptions::default())
            .unwrap_err();
        assert!(matches!(err, ToolCacheError::DownloadRequest { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn download_applies_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let url = serve(200, b"#!/bin/sh\n", 1);

        let path = downloader(&dir)
            .download(&url, &DownloadOptions::default().with_permissions(0o755))
            .unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
