//! CLI command implementations.

pub mod clear;
pub mod collect;
pub mod inspect;
pub mod render;
