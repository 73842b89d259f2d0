//! Raw filesystem backends.

mod local;

pub use local::LocalFs;
