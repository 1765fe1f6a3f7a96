//! Error types for heat-map rendering.

use thiserror::Error;

/// Result type for heat-map operations.
pub type HeatmapResult<T> = Result<T, HeatmapError>;

/// Errors raised while configuring a heat map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeatmapError {
    /// A colour scale needs at least one colour.
    #[error("colour scale is empty")]
    EmptyScale,

    /// A colour is not a `#rgb` or `#rrggbb` hex colour.
    #[error("invalid colour: {0:?}")]
    InvalidColor(String),
}
