//! RETRACE Trace Log
//!
//! Line-oriented cycle trace parsing and a live, file-backed trace store.
//! The store never writes; every query re-reads the file so appends by the
//! generator become visible without invalidation.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod listing;
pub mod record;
pub mod store;
pub mod trace;

pub use listing::ProgramListing;
pub use record::{Entry, Record};
pub use store::{StoreConfig, TraceStore};
pub use trace::TraceLog;
