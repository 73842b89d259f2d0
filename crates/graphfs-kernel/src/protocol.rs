//! Wire protocol for remote callers.
//!
//! One JSON object per line in each direction. Requests carry an `op` tag and
//! an optional `id` that is echoed back:
//!
//! ```json
//! {"id":7,"op":"read_file","path":"pages/a.md"}
//! {"id":7,"ok":"- hello\n"}
//! {"id":8,"error":{"code":"out_of_scope","message":"path ../x is outside of root /g"}}
//! ```

use serde::{Deserialize, Serialize};

use crate::backup::BackupRecord;
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{FileGateway, FileWithContent, WriteRequest};
use crate::recycle::RecycleRecord;
use crate::vfs::FileStat;

/// A gateway operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Mkdir {
        path: String,
    },
    MkdirRecursive {
        path: String,
    },
    List {
        dir: String,
    },
    ReadFile {
        path: String,
    },
    WriteFile(WriteRequest),
    Stat {
        path: String,
    },
    UnlinkFile {
        repo_root: String,
        path: String,
    },
    Rename {
        old_path: String,
        new_path: String,
    },
    CopyFile {
        old_path: String,
        new_path: String,
    },
    ListWithContent {
        dir: String,
    },
    BackupDbFile {
        repo_root: String,
        path: String,
        disk_content: String,
        new_content: String,
    },
    WatchDir {
        dir: String,
    },
    UnwatchDir {
        dir: String,
    },
}

/// A request as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub request: Request,
}

/// Successful operation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Operations with no result (serialized as `null`).
    Done,
    Paths(Vec<String>),
    Text(String),
    Stat(Option<FileStat>),
    Recycled(RecycleRecord),
    Files(Vec<FileWithContent>),
    Backup(Option<BackupRecord>),
}

/// Error payload of a [`Reply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireError {
    pub code: String,
    pub message: String,
}

impl From<&GatewayError> for WireError {
    fn from(e: &GatewayError) -> Self {
        Self {
            code: e.code().to_string(),
            message: e.to_string(),
        }
    }
}

/// A response line: exactly one of `ok` or `error` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
}

impl Reply {
    pub fn from_result(id: Option<u64>, result: GatewayResult<Response>) -> Self {
        match result {
            Ok(response) => Self {
                id,
                ok: Some(response),
                error: None,
            },
            Err(e) => Self {
                id,
                ok: None,
                error: Some(WireError::from(&e)),
            },
        }
    }

    /// Reply to a line that could not be parsed as a request.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            id: None,
            ok: None,
            error: Some(WireError {
                code: "invalid_request".to_string(),
                message: message.into(),
            }),
        }
    }
}

impl FileGateway {
    /// Run one request against the gateway.
    pub async fn handle(&self, request: Request) -> GatewayResult<Response> {
        match request {
            Request::Mkdir { path } => self.mkdir(&path).await.map(|()| Response::Done),
            Request::MkdirRecursive { path } => {
                self.mkdir_recursive(&path).await.map(|()| Response::Done)
            }
            Request::List { dir } => self.list(&dir).await.map(Response::Paths),
            Request::ReadFile { path } => self.read_file(&path).await.map(Response::Text),
            Request::WriteFile(write) => self
                .write_file(write)
                .await
                .map(|stat| Response::Stat(Some(stat))),
            Request::Stat { path } => self.stat(&path).await.map(Response::Stat),
            Request::UnlinkFile { repo_root, path } => self
                .unlink_file(&repo_root, &path)
                .await
                .map(Response::Recycled),
            Request::Rename { old_path, new_path } => self
                .rename(&old_path, &new_path)
                .await
                .map(|()| Response::Done),
            Request::CopyFile { old_path, new_path } => self
                .copy_file(&old_path, &new_path)
                .await
                .map(|()| Response::Done),
            Request::ListWithContent { dir } => {
                self.list_with_content(&dir).await.map(Response::Files)
            }
            Request::BackupDbFile {
                repo_root,
                path,
                disk_content,
                new_content,
            } => self
                .backup_db_file(&repo_root, &path, &disk_content, &new_content)
                .await
                .map(Response::Backup),
            Request::WatchDir { dir } => self.watch_dir(&dir).await.map(|()| Response::Done),
            Request::UnwatchDir { dir } => self.unwatch_dir(&dir).await.map(|()| Response::Done),
        }
    }

    /// Run a parsed envelope and build its reply.
    pub async fn handle_envelope(&self, envelope: Envelope) -> Reply {
        let result = self.handle(envelope.request).await;
        if let Err(e) = &result {
            tracing::debug!(id = ?envelope.id, code = %e.code(), "request failed: {e}");
        }
        Reply::from_result(envelope.id, result)
    }
}
