//! Raw filesystem layer.
//!
//! The gateway never touches the OS directly. It calls a [`RawFs`]
//! implementation with paths that have already passed the root scope:
//!
//! - [`RawFs`] - Thin OS primitives (read, write, stat, rename, copy, list)
//! - [`LocalFs`] - `tokio::fs` implementation
//! - [`FileStat`], [`DirEntry`] - Transient values produced per call

pub mod backends;
mod ops;
mod types;

pub use backends::LocalFs;
pub use ops::RawFs;
pub use types::{DirEntry, EntryKind, FileStat};
