//! Gateway error types.

use std::io;
use std::path::Path;

use thiserror::Error;

/// Error returned by every [`FileGateway`](crate::FileGateway) operation.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Path resolves outside the configured root (security violation).
    #[error("path {path} is outside of root {root}")]
    OutOfScope { path: String, root: String },

    /// File or directory not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Metadata lookup failed for a reason other than absence.
    #[error("stat failed for {path}: {source}")]
    ProbeFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Reading file content failed.
    #[error("read failed for {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Committing new content failed.
    #[error("write failed for {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Saving a backup copy failed. Never surfaced by the write path.
    #[error("backup failed for {path}: {source}")]
    BackupFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Directory deletion is refused.
    #[error("refusing to delete directory: {0}")]
    DangerousOperation(String),

    /// Operation is not available on this backend.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Any other I/O failure (mkdir, rename, copy, list).
    #[error("{op} failed for {path}: {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Stable wire identifier for a [`GatewayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
    OutOfScope,
    NotFound,
    ProbeFailed,
    ReadFailed,
    WriteFailed,
    BackupFailed,
    DangerousOperation,
    Unsupported,
    Io,
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

impl GatewayError {
    /// Create an OutOfScope error.
    pub fn out_of_scope(path: impl Into<String>, root: &Path) -> Self {
        Self::OutOfScope {
            path: path.into(),
            root: display(root),
        }
    }

    /// Create a NotFound error.
    pub fn not_found(path: &Path) -> Self {
        Self::NotFound(display(path))
    }

    /// Create a ProbeFailed error.
    pub fn probe_failed(path: &Path, source: io::Error) -> Self {
        Self::ProbeFailed {
            path: display(path),
            source,
        }
    }

    /// Create a ReadFailed error, mapping `NotFound` to [`GatewayError::NotFound`].
    pub fn read_failed(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            return Self::not_found(path);
        }
        Self::ReadFailed {
            path: display(path),
            source,
        }
    }

    /// Create a WriteFailed error.
    pub fn write_failed(path: &Path, source: io::Error) -> Self {
        Self::WriteFailed {
            path: display(path),
            source,
        }
    }

    /// Create a BackupFailed error.
    pub fn backup_failed(path: &Path, source: io::Error) -> Self {
        Self::BackupFailed {
            path: display(path),
            source,
        }
    }

    /// Create a DangerousOperation error.
    pub fn dangerous(path: &Path) -> Self {
        Self::DangerousOperation(display(path))
    }

    /// Create an Unsupported error.
    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::Unsupported(what.into())
    }

    /// Create an Io error for the named operation.
    pub fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            op,
            path: display(path),
            source,
        }
    }

    /// The wire code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::OutOfScope { .. } => ErrorCode::OutOfScope,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::ProbeFailed { .. } => ErrorCode::ProbeFailed,
            Self::ReadFailed { .. } => ErrorCode::ReadFailed,
            Self::WriteFailed { .. } => ErrorCode::WriteFailed,
            Self::BackupFailed { .. } => ErrorCode::BackupFailed,
            Self::DangerousOperation(_) => ErrorCode::DangerousOperation,
            Self::Unsupported(_) => ErrorCode::Unsupported,
            Self::Io { .. } => ErrorCode::Io,
        }
    }
}

/// Convert GatewayError to std::io::Error for compatibility.
impl From<GatewayError> for io::Error {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::OutOfScope { .. } => {
                io::Error::new(io::ErrorKind::PermissionDenied, e.to_string())
            }
            GatewayError::NotFound(msg) => io::Error::new(io::ErrorKind::NotFound, msg),
            GatewayError::ProbeFailed { source, .. }
            | GatewayError::ReadFailed { source, .. }
            | GatewayError::WriteFailed { source, .. }
            | GatewayError::BackupFailed { source, .. }
            | GatewayError::Io { source, .. } => source,
            GatewayError::DangerousOperation(msg) => {
                io::Error::new(io::ErrorKind::IsADirectory, msg)
            }
            GatewayError::Unsupported(msg) => io::Error::new(io::ErrorKind::Unsupported, msg),
        }
    }
}

/// Gateway result type.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_failed_maps_not_found() {
        let err = GatewayError::read_failed(
            Path::new("/g/a.md"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, GatewayError::NotFound(ref p) if p == "/g/a.md"));

        let err = GatewayError::read_failed(
            Path::new("/g/a.md"),
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert_eq!(err.code(), ErrorCode::ReadFailed);
    }

    #[test]
    fn test_codes_are_snake_case() {
        let err = GatewayError::out_of_scope("../x", Path::new("/g"));
        assert_eq!(err.code().to_string(), "out_of_scope");
        let code: &'static str = ErrorCode::DangerousOperation.into();
        assert_eq!(code, "dangerous_operation");
    }

    #[test]
    fn test_out_of_scope_message_names_path_and_root() {
        let err = GatewayError::out_of_scope("../../etc/passwd", Path::new("/graphs/alice"));
        let msg = err.to_string();
        assert!(msg.contains("../../etc/passwd"));
        assert!(msg.contains("/graphs/alice"));
    }
}
