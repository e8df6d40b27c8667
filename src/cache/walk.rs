//! Lazy traversal of a cache source
//!
//! Yields `(relative path, source path)` pairs for every non-directory entry
//! under a source, leaving the copy policy to the caller.

use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One file found under a cache source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the source root; empty when the source is a single file
    pub relative: PathBuf,
    /// Absolute or caller-relative path to read from
    pub path: PathBuf,
}

/// Iterator over the files of a source file or directory
pub struct SourceFiles {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl SourceFiles {
    /// Start walking `root`
    ///
    /// Symlinks are not followed while walking; a symlink is reported as a
    /// file and its target is read when copied.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            inner: WalkDir::new(root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter(),
        }
    }
}

impl Iterator for SourceFiles {
    type Item = io::Result<SourceFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(walk_error(e))),
            };
            if entry.file_type().is_dir() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map(Path::to_path_buf)
                .unwrap_or_default();
            return Some(Ok(SourceFile {
                relative,
                path: entry.into_path(),
            }));
        }
    }
}

fn walk_error(err: walkdir::Error) -> io::Error {
    let path = err.path().map(|p| p.display().to_string());
    match err.into_io_error() {
        Some(io_err) => match path {
            Some(path) => io::Error::new(io_err.kind(), format!("{}: {}", path, io_err)),
            None => io_err,
        },
        None => io::Error::other("filesystem loop while walking source"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn collect(root: &Path) -> Vec<SourceFile> {
        SourceFiles::new(root).collect::<io::Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn single_file_has_empty_relative_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("tool");
        fs::write(&file, b"bin").unwrap();

        let files = collect(&file);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative, PathBuf::new());
        assert_eq!(files[0].path, file);
    }

    #[test]
    fn directory_yields_nested_files_only() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("bin/sub")).unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("README"), b"r").unwrap();
        fs::write(dir.path().join("bin/tool"), b"t").unwrap();
        fs::write(dir.path().join("bin/sub/lib"), b"l").unwrap();

        let relative: Vec<PathBuf> = collect(dir.path()).into_iter().map(|f| f.relative).collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("README"),
                PathBuf::from("bin/sub/lib"),
                PathBuf::from("bin/tool"),
            ]
        );
    }

    #[test]
    fn missing_source_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut files = SourceFiles::new(&dir.path().join("nope"));
        assert!(files.next().unwrap().is_err());
    }
}
