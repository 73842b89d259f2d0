//! # graphfs-kernel
//!
//! Root-scoped file gateway for graph directories of plain-text pages.
//!
//! The gateway is the only way in. It:
//! - Confines every path to a configured root before any I/O happens
//! - Backs up disk content that changed behind the caller's back before overwriting it
//! - Moves deleted files into a recycle area instead of erasing them
//! - Refuses to delete directories
//!
//! Callers talk to it directly ([`FileGateway`]) or over the line protocol in
//! [`protocol`].

pub mod backup;
pub mod cache;
pub mod config;
pub mod conflict;
pub mod error;
pub mod flatten;
pub mod gateway;
pub mod guard;
pub mod probe;
pub mod protocol;
pub mod recycle;
pub mod vfs;
pub mod walk;

pub use backup::BackupRecord;
pub use cache::{DocumentCache, MemoryDocumentCache};
pub use config::{ConfigError, GatewayConfig};
pub use error::{ErrorCode, GatewayError, GatewayResult};
pub use gateway::{FileGateway, FileWithContent, WriteRequest, WriteStage};
pub use guard::{ResolvedPath, RootScope};
pub use protocol::{Envelope, Reply, Request, Response, WireError};
pub use recycle::RecycleRecord;
pub use vfs::{DirEntry, EntryKind, FileStat, LocalFs, RawFs};
