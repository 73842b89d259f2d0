//! Existence and metadata probe.

use std::io;
use std::path::Path;

use crate::error::{GatewayError, GatewayResult};
use crate::vfs::{FileStat, RawFs};

/// Stat `path`, reporting absence as `Ok(None)`.
///
/// Only `NotFound` becomes `None`; permission and other I/O failures are
/// `ProbeFailed` so callers never mistake an unreadable file for a new one.
pub async fn stat(fs: &dyn RawFs, path: &Path) -> GatewayResult<Option<FileStat>> {
    absent_as_none(fs.stat(path).await, path)
}

/// Like [`stat`], but a final symlink is reported as itself.
pub async fn stat_entry(fs: &dyn RawFs, path: &Path) -> GatewayResult<Option<FileStat>> {
    absent_as_none(fs.stat_entry(path).await, path)
}

fn absent_as_none(result: io::Result<FileStat>, path: &Path) -> GatewayResult<Option<FileStat>> {
    match result {
        Ok(stat) => Ok(Some(stat)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(GatewayError::probe_failed(path, e)),
    }
}
