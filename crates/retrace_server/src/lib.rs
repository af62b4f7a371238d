//! RETRACE Server
//!
//! HTTP front end for stepping a replay cursor from a browser.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;

pub use api::{ApiError, ApiServer, AppState, RunRequest, ServerConfig, router};
