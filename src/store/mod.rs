//! File storage behind the reorganizer.
//!
//! All paths handed to a [`FileStore`] are relative to the store's root; the
//! empty path is the root itself. [`LocalStore`] maps a root directory on the
//! local filesystem.
//!
//! Listing failures are structural and come back as
//! [`Error::StoreUnavailable`]; they end the run. Read, write and delete
//! failures on single files are plain I/O errors the caller reports.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result, ResultExt};

/// Storage the reorganizer reads from and writes to.
pub trait FileStore {
    /// Files directly inside `dir`, sorted by name.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Subdirectories directly inside `dir`, sorted by name.
    fn list_directories(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Every file anywhere beneath `dir`.
    fn all_files_recursive(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Every directory anywhere beneath `dir`.
    fn all_directories_recursive(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    fn read_stream(&self, path: &Path) -> Result<Box<dyn Read>>;

    /// Write `contents` to `path`, creating parent directories as needed.
    fn put(&self, path: &Path, contents: &mut dyn Read) -> Result<()>;

    fn delete(&self, path: &Path) -> Result<()>;

    fn delete_directory(&self, dir: &Path) -> Result<()>;

    /// Absolute location of `path`, used to detect no-op moves.
    fn resolve_absolute(&self, path: &Path) -> PathBuf;
}

/// A directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open an existing directory. The root is stored fully resolved.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = fs::canonicalize(root.as_ref())
            .map_err(|e| Error::store_unavailable(root.as_ref(), e))?;
        if !root.is_dir() {
            return Err(Error::store_unavailable(
                &root,
                io::Error::new(io::ErrorKind::NotFound, "not a directory"),
            ));
        }
        Ok(Self { root })
    }

    /// Open a directory, creating it first if it is missing.
    pub fn create(root: impl AsRef<Path>) -> Result<Self> {
        fs::create_dir_all(root.as_ref())
            .map_err(|e| Error::store_unavailable(root.as_ref(), e))?;
        Self::open(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self, dir: &Path, want_dirs: bool) -> Result<Vec<PathBuf>> {
        let absolute = self.root.join(dir);
        let entries =
            fs::read_dir(&absolute).map_err(|e| Error::store_unavailable(&absolute, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::store_unavailable(&absolute, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| Error::store_unavailable(entry.path(), e))?;
            if file_type.is_dir() == want_dirs {
                paths.push(dir.join(entry.file_name()));
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn walk(&self, dir: &Path, want_dirs: bool) -> Result<Vec<PathBuf>> {
        let absolute = self.root.join(dir);
        let mut paths = Vec::new();
        for entry in WalkDir::new(&absolute).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::store_unavailable(&absolute, e.into()))?;
            if entry.file_type().is_dir() == want_dirs {
                let relative = entry
                    .path()
                    .strip_prefix(&self.root)
                    .unwrap_or(entry.path());
                paths.push(relative.to_path_buf());
            }
        }
        Ok(paths)
    }
}

impl FileStore for LocalStore {
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.list(dir, false)
    }

    fn list_directories(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.list(dir, true)
    }

    fn all_files_recursive(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.walk(dir, false)
    }

    fn all_directories_recursive(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        self.walk(dir, true)
    }

    fn read_stream(&self, path: &Path) -> Result<Box<dyn Read>> {
        let absolute = self.root.join(path);
        let file = File::open(&absolute)
            .with_context(format!("Failed to open {}", absolute.display()))?;
        Ok(Box::new(file))
    }

    fn put(&self, path: &Path, contents: &mut dyn Read) -> Result<()> {
        let absolute = self.root.join(path);
        if let Some(parent) = absolute.parent() {
            fs::create_dir_all(parent)
                .with_context(format!("Failed to create directory {}", parent.display()))?;
        }
        let mut file = File::create(&absolute)
            .with_context(format!("Failed to create {}", absolute.display()))?;
        let bytes = io::copy(contents, &mut file)
            .with_context(format!("Failed to write {}", absolute.display()))?;
        debug!(path = %absolute.display(), bytes, "Wrote file");
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        let absolute = self.root.join(path);
        fs::remove_file(&absolute)
            .with_context(format!("Failed to remove {}", absolute.display()))
    }

    fn delete_directory(&self, dir: &Path) -> Result<()> {
        let absolute = self.root.join(dir);
        fs::remove_dir_all(&absolute)
            .with_context(format!("Failed to remove directory {}", absolute.display()))
    }

    fn resolve_absolute(&self, path: &Path) -> PathBuf {
        resolve(&self.root.join(path))
    }
}

/// Canonicalize the longest existing ancestor of `path` and re-append the
/// components that do not exist yet.
fn resolve(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        if let Ok(resolved) = fs::canonicalize(existing) {
            return missing
                .iter()
                .rev()
                .fold(resolved, |acc: PathBuf, name| acc.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}
