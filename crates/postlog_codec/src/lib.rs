//! # Postlog Codec
//!
//! Post history model and text codec for postlog.
//!
//! A blog's publishing history is a [`PostLog`]: calendar day to number of
//! posts published that day. It is persisted inside an ordinary blog post
//! (the *storage post*) as a flat token string:
//!
//! ```text
//! <div id="__LOG_DATA__">2024-01-01:2 2024-01-02:1</div>
//! ```
//!
//! ## Format Rules
//!
//! - Tokens are `YYYY-MM-DD:COUNT`, separated by whitespace
//! - Tokens are written in ascending date order
//! - COUNT is a positive integer without leading zeros
//! - Any invalid token fails the whole decode (never skipped)
//!
//! ## Usage
//!
//! ```
//! use postlog_codec::{decode, encode};
//!
//! let log = decode("2024-01-02:1 2024-01-01:2").unwrap();
//! assert_eq!(encode(&log), "2024-01-01:2 2024-01-02:1");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod container;
mod decoder;
mod encoder;
mod error;
mod log;

pub use container::{
    decode_storage, extract_container, is_empty_storage, wrap_container, CONTAINER_ID,
    EMPTY_CONTAINER,
};
pub use decoder::{decode, decode_token};
pub use encoder::encode;
pub use error::{CodecError, CodecResult};
pub use log::{Iter, PostLog};

/// Encode a log into a complete storage post body.
pub fn encode_storage(log: &PostLog) -> String {
    wrap_container(&encode(log))
}
