//! # Postlog Heatmap
//!
//! Renders a post log as a calendar heat map of the trailing year, one
//! square per day, coloured by how many posts were published that day.
//!
//! ```
//! use chrono::NaiveDate;
//! use postlog_codec::decode;
//! use postlog_heatmap::{render_svg, CalendarGrid, ColorScale, RenderOptions};
//!
//! let log = decode("2024-06-01:2").unwrap();
//! let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//! let scale = ColorScale::default();
//! let grid = CalendarGrid::build(&log, today, &scale);
//! let svg = render_svg(&grid, &scale, &RenderOptions::default());
//! assert!(svg.contains("2 posts in the last year"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod grid;
mod scale;
mod svg;

pub use error::{HeatmapError, HeatmapResult};
pub use grid::{CalendarGrid, Cell, MonthLabel, DAYS_PER_WEEK, WEEKS};
pub use scale::{ColorScale, DEFAULT_COLORS};
pub use svg::{
    render_svg, visible_month_labels, RenderOptions, CELL_SIZE, GRID_OFFSET, MIN_LABEL_GAP, STEP,
};
