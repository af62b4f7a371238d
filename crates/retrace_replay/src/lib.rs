//! RETRACE Replay
//!
//! A cursor over a pre-computed cycle trace. Each movement rebuilds the
//! full state of the machine for the new cycle from the trace on disk.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cursor;
pub mod snapshot;

pub use cursor::{ReplayConfig, ReplayCursor};
pub use snapshot::{RESERVED_KEYS, Snapshot};
