//! # Postlog Sync Engine
//!
//! Incremental collector for a blog's publishing history.
//!
//! This crate provides:
//! - Collect and clear runs (load → window → paginate → merge → save)
//! - Calendar-month windowing and one-year retention
//! - Visibility inclusion mask
//! - Remote blog gateway abstraction with an in-memory fake
//! - HTTP gateway for the Tistory Open API
//!
//! ## Architecture
//!
//! Each run rebuilds the [`PostLog`](postlog_codec::PostLog) from the storage
//! post, drops the trailing `update_range` months, recounts them from the
//! listing (most recent first, stopping at the first post before the window)
//! and writes the merged log back.
//!
//! ## Key Invariants
//!
//! - Days inside the window are replaced, never summed
//! - Nothing is written unless the whole window was recounted
//! - A storage post that does not decode is never overwritten
//! - The engine never retries; callers decide
//! - One run per engine at a time

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod config;
mod error;
mod gateway;
mod http;
mod request;
mod retention;
mod state;
mod visibility;

pub use clock::{Clock, FixedClock, SystemClock, DEFAULT_TIMEZONE, LOCAL_TIMEZONE};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use gateway::{
    BlogGateway, MemoryGateway, PostPage, PostSummary, Session, StoredPost, WritePost,
};
pub use http::{
    AppKey, Credentials, HttpClient, HttpResponse, ReqwestClient, TistoryGateway,
    DEFAULT_BASE_URL,
};
pub use request::{ClearRequest, CollectRequest};
pub use retention::{months_before, RetentionPolicy, MAX_UPDATE_RANGE, MIN_UPDATE_RANGE};
pub use state::{SyncEngine, SyncState, SyncStats};
pub use visibility::{IncludeMask, Visibility, WriteVisibility};
