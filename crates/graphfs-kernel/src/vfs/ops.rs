//! Raw filesystem operations trait.
//!
//! The gateway treats these primitives as a black box: they do no path
//! validation and no conflict handling. Every path handed to a `RawFs` has
//! already been resolved and checked against the root scope.

use async_trait::async_trait;
use std::io;
use std::path::Path;

use super::types::{DirEntry, FileStat};

/// Thin OS wrapper the gateway calls into.
///
/// All paths are absolute. Errors are plain `io::Error` so callers can branch
/// on `ErrorKind` (most importantly `NotFound` and `AlreadyExists`).
#[async_trait]
pub trait RawFs: Send + Sync {
    // ========================================================================
    // Reading
    // ========================================================================

    /// Get metadata, following symlinks.
    async fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Get metadata of the entry itself; a final symlink reports as `Symlink`.
    async fn stat_entry(&self, path: &Path) -> io::Result<FileStat>;

    /// Read the whole file.
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// List one directory level, sorted by name, without following symlinks.
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    // ========================================================================
    // Writing
    // ========================================================================

    /// Create or truncate the file and write `data`.
    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Create a single directory. Fails with `AlreadyExists` if present.
    async fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Create a directory and all missing parents. Succeeds if present.
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Move a file or directory.
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Copy a file, replacing the destination.
    async fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove a file.
    async fn remove_file(&self, path: &Path) -> io::Result<()>;
}
