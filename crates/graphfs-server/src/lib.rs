//! graphfs server library
//!
//! Serves a [`FileGateway`] over a Unix socket. Clients connect, send one JSON
//! request per line, and get one JSON reply per line in the same order.
//! Connections stay open until the client closes them or sends a line longer
//! than the configured limit.

use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};

use graphfs_kernel::{Envelope, FileGateway, Reply};

/// Socket file name used when none is configured.
pub const DEFAULT_SOCKET_NAME: &str = "graphfs.sock";

/// Default maximum request line length in bytes (newline included).
pub const DEFAULT_MAX_LINE_BYTES: usize = 16 * 1024 * 1024;

/// Default socket location: the user runtime dir, else the temp dir.
pub fn default_socket_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(DEFAULT_SOCKET_NAME)
}

/// Line-protocol server for one gateway.
pub struct Server {
    gateway: Arc<FileGateway>,
    max_line_bytes: usize,
}

impl Server {
    pub fn new(gateway: Arc<FileGateway>) -> Self {
        Self {
            gateway,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }

    /// Limit the length of one request line.
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes.max(1);
        self
    }

    /// Bind the socket, replacing a stale socket from an earlier run.
    ///
    /// Anything other than a socket at `socket_path` is left alone and
    /// reported as an error.
    pub async fn bind(socket_path: &Path) -> anyhow::Result<UnixListener> {
        if let Some(parent) = socket_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        match tokio::fs::symlink_metadata(socket_path).await {
            Ok(meta) if meta.file_type().is_socket() => {
                tokio::fs::remove_file(socket_path)
                    .await
                    .with_context(|| format!("removing stale socket {}", socket_path.display()))?;
            }
            Ok(_) => anyhow::bail!(
                "refusing to replace {}: not a socket",
                socket_path.display()
            ),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("inspecting {}", socket_path.display()));
            }
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("binding {}", socket_path.display()))?;
        tracing::info!(path = %socket_path.display(), "gateway socket listening");
        Ok(listener)
    }

    /// Bind `socket_path` and serve until the task is cancelled.
    pub async fn run(self: Arc<Self>, socket_path: PathBuf) -> anyhow::Result<()> {
        let listener = Self::bind(&socket_path).await?;
        self.serve(listener).await
    }

    /// Accept connections forever, one task per connection.
    pub async fn serve(self: Arc<Self>, listener: UnixListener) -> anyhow::Result<()> {
        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let this = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = this.handle_connection(stream).await {
                            tracing::debug!("connection error: {e}");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!("accept error: {e}");
                }
            }
        }
    }

    async fn handle_connection(&self, stream: UnixStream) -> anyhow::Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let limit = self.max_line_bytes as u64;

        loop {
            buf.clear();
            let n = (&mut reader).take(limit).read_until(b'\n', &mut buf).await?;
            if n == 0 {
                return Ok(());
            }
            if buf.last() != Some(&b'\n') && n as u64 == limit {
                // No way to find the next request boundary; drop the client.
                let reply = Reply::invalid_request(format!(
                    "request line exceeds {} bytes",
                    self.max_line_bytes
                ));
                write_reply(&mut writer, &reply).await?;
                return Ok(());
            }

            let reply = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line.trim()).await,
                Err(e) => Reply::invalid_request(format!("Invalid UTF-8: {e}")),
            };
            write_reply(&mut writer, &reply).await?;
        }
    }

    /// Parse and run one request line.
    pub async fn handle_line(&self, line: &str) -> Reply {
        match serde_json::from_str::<Envelope>(line) {
            Ok(envelope) => self.gateway.handle_envelope(envelope).await,
            Err(e) => {
                tracing::debug!("rejecting malformed request: {e}");
                Reply::invalid_request(format!("Invalid JSON: {e}"))
            }
        }
    }
}

async fn write_reply(writer: &mut OwnedWriteHalf, reply: &Reply) -> anyhow::Result<()> {
    let json = serde_json::to_string(reply)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    Ok(())
}
