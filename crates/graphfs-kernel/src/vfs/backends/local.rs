//! Local filesystem backend.
//!
//! Direct `tokio::fs` access. Containment is not checked here; the gateway
//! resolves every path through the root scope before calling in.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::fs;

use crate::vfs::ops::RawFs;
use crate::vfs::types::{DirEntry, EntryKind, FileStat};

/// Local filesystem backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a new local filesystem backend.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RawFs for LocalFs {
    async fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let meta = fs::metadata(path).await?;
        Ok(FileStat::from_metadata(&meta))
    }

    async fn stat_entry(&self, path: &Path) -> io::Result<FileStat> {
        let meta = fs::symlink_metadata(path).await?;
        Ok(FileStat::from_metadata(&meta))
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path).await
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(path).await?;

        while let Some(entry) = dir.next_entry().await? {
            let file_type = entry.file_type().await?;
            let kind = if file_type.is_symlink() {
                EntryKind::Symlink
            } else if file_type.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };

            entries.push(DirEntry::new(entry.file_name().to_string_lossy(), kind));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        fs::write(path, data).await
    }

    async fn create_dir(&self, path: &Path) -> io::Result<()> {
        fs::create_dir(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to).await
    }

    async fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::copy(from, to).await.map(|_| ())
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path).await
    }
}
