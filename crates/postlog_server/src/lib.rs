//! # Postlog Server
//!
//! HTTP adapter that lets a scheduler trigger collect and clear runs.
//!
//! This crate provides:
//! - `POST /collect` and `POST /clear`, answering `OK` or the error message
//! - `GET /health` with the engine state and run counters
//! - Configuration from `POSTLOG_*` environment variables
//!
//! # Architecture
//!
//! The engine and its blocking HTTP gateway are built before the async
//! runtime starts. Each request hands the engine call to the blocking pool,
//! so one router can drive any [`BlogGateway`](postlog_sync_engine::BlogGateway).
//!
//! ```rust,ignore
//! use postlog_server::{router, AppState, ServerConfig};
//!
//! let config = ServerConfig::from_env()?;
//! let state = AppState::new(engine, config.collect_request(), config.clear_request());
//! let app = router(state);
//! ```
//!
//! A second request arriving while a run is in flight is refused with the
//! engine's invalid state transition error.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod handler;
mod server;

pub use config::{ServerConfig, ENV_PREFIX};
pub use error::{ServerError, ServerResult};
pub use handler::{router, AppState};
pub use server::serve;
