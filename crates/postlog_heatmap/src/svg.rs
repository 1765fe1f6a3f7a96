//! SVG output.

use crate::grid::{CalendarGrid, MonthLabel};
use crate::scale::ColorScale;
use std::fmt::Write;

/// Side of a day square, in pixels.
pub const CELL_SIZE: u32 = 12;

/// Distance between neighbouring columns and rows, in pixels.
pub const STEP: u32 = 14;

/// Margin left of and above the grid, in pixels.
pub const GRID_OFFSET: u32 = 26;

/// Labels closer than this to the next one are dropped, in pixels.
pub const MIN_LABEL_GAP: u32 = 40;

const WIDTH: u32 = 755;
const GRID_HEIGHT: u32 = 128;
const HEADER_HEIGHT: u32 = 20;
const LEGEND_HEIGHT: u32 = 20;
const LEGEND_TEXT_WIDTH: u32 = 32;

/// Texts and switches of the rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Month names, January first.
    pub month_names: [String; 12],
    /// Labels of the Monday, Wednesday and Friday rows.
    pub weekday_labels: [String; 3],
    /// Singular and plural noun for posts.
    pub post_nouns: [String; 2],
    /// Texts at the light and dark ends of the legend.
    pub legend_labels: [String; 2],
    /// Whether to print the "N posts in the last year" header.
    pub show_header: bool,
    /// Whether to draw the colour legend under the grid.
    pub show_legend: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            month_names: [
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ]
            .map(String::from),
            weekday_labels: ["M", "W", "F"].map(String::from),
            post_nouns: ["post", "posts"].map(String::from),
            legend_labels: ["Less", "More"].map(String::from),
            show_header: true,
            show_legend: true,
        }
    }
}

impl RenderOptions {
    fn noun(&self, plural: bool) -> &str {
        &self.post_nouns[usize::from(plural)]
    }
}

/// Month labels that are drawn.
///
/// The label of the first column is dropped when the next label would sit
/// closer than [`MIN_LABEL_GAP`] to it.
pub fn visible_month_labels(labels: &[MonthLabel]) -> &[MonthLabel] {
    match labels {
        [first, second, ..] if (second.week - first.week) as u32 * STEP < MIN_LABEL_GAP => {
            &labels[1..]
        }
        _ => labels,
    }
}

/// Renders the grid as a standalone SVG document.
pub fn render_svg(grid: &CalendarGrid, scale: &ColorScale, options: &RenderOptions) -> String {
    let top = if options.show_header { HEADER_HEIGHT } else { 0 };
    let legend = if options.show_legend { LEGEND_HEIGHT } else { 0 };
    let height = top + GRID_HEIGHT + legend;

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" class="calendar-graph">"#
    );

    if options.show_header {
        let total = grid.total_posts();
        let _ = write!(
            out,
            r#"<text x="{GRID_OFFSET}" y="14" class="header">{} {} in the last year</text>"#,
            with_commas(total),
            escape(options.noun(total > 1))
        );
    }

    let _ = write!(out, r#"<g transform="translate({GRID_OFFSET}, {})">"#, top + GRID_OFFSET);

    let mut week = None;
    for cell in grid.cells() {
        if week != Some(cell.week) {
            if week.is_some() {
                out.push_str("</g>");
            }
            let _ = write!(out, r#"<g transform="translate({},0)">"#, cell.week as u32 * STEP);
            week = Some(cell.week);
        }
        let _ = write!(
            out,
            r#"<rect class="day" width="{CELL_SIZE}" height="{CELL_SIZE}" y="{}" fill="{}" data-count="{}" data-date="{date}"><title>{} {} on {date}</title></rect>"#,
            cell.weekday as u32 * STEP,
            scale.tier_color(cell.tier),
            cell.count,
            cell.count,
            escape(options.noun(cell.count != 1)),
            date = cell.date.format("%Y-%m-%d"),
        );
    }
    if week.is_some() {
        out.push_str("</g>");
    }

    for label in visible_month_labels(grid.month_labels()) {
        let name = options
            .month_names
            .get(label.month.saturating_sub(1) as usize)
            .map(String::as_str)
            .unwrap_or_default();
        let _ = write!(
            out,
            r#"<text x="{}" y="-5" class="month">{}</text>"#,
            label.week as u32 * STEP,
            escape(name)
        );
    }

    for (label, dy) in options.weekday_labels.iter().zip([24, 53, 80]) {
        let _ = write!(
            out,
            r#"<text text-anchor="middle" class="wday" dx="-10" dy="{dy}">{}</text>"#,
            escape(label)
        );
    }

    out.push_str("</g>");
    if options.show_legend {
        render_legend(&mut out, scale, options, top + GRID_HEIGHT);
    }
    out.push_str("</svg>");
    out
}

/// Draws "Less", one square per palette colour, then "More", right-aligned.
fn render_legend(out: &mut String, scale: &ColorScale, options: &RenderOptions, y: u32) {
    let squares = scale.len() as u32 * STEP;
    let x = WIDTH.saturating_sub(GRID_OFFSET + 2 * LEGEND_TEXT_WIDTH + squares);
    let _ = write!(out, r#"<g class="legend" transform="translate({x}, {y})">"#);
    let _ = write!(
        out,
        r#"<text x="0" y="10" class="legend-label">{}</text>"#,
        escape(&options.legend_labels[0])
    );
    for (i, color) in scale.colors().iter().enumerate() {
        let _ = write!(
            out,
            r#"<rect class="legend-day" width="{CELL_SIZE}" height="{CELL_SIZE}" x="{}" fill="{color}"/>"#,
            LEGEND_TEXT_WIDTH + i as u32 * STEP
        );
    }
    let _ = write!(
        out,
        r#"<text x="{}" y="10" class="legend-label">{}</text>"#,
        LEGEND_TEXT_WIDTH + squares + 4,
        escape(&options.legend_labels[1])
    );
    out.push_str("</g>");
}

fn with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
