//! # Postlog Testkit
//!
//! Test utilities for postlog.
//!
//! This crate provides:
//! - A seeded in-memory blog and engines with a frozen clock
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use postlog_testkit::prelude::*;
//!
//! #[test]
//! fn counts_published_posts() {
//!     let engine = TestBlog::with_storage("")
//!         .posts(day(2024, 6, 1), 2, Visibility::Published)
//!         .engine(day(2024, 6, 15));
//!     let log = engine.collect(&collect_request()).unwrap();
//!     assert_eq!(log.get(day(2024, 6, 1)), 2);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use postlog_sync_engine::Visibility;
}

pub use fixtures::*;
pub use generators::*;
