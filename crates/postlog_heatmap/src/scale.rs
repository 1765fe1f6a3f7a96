//! Count to colour mapping.

use crate::error::{HeatmapError, HeatmapResult};

/// Default palette, from no posts to the busiest days.
pub const DEFAULT_COLORS: [&str; 5] = ["#eeeeee", "#d6e685", "#8cc665", "#44a340", "#44a340"];

/// Ordered colours; a day with `n` posts gets colour `min(n, len - 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScale {
    colors: Vec<String>,
}

impl ColorScale {
    /// Creates a scale, checking every colour.
    pub fn new<I, S>(colors: I) -> HeatmapResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let colors: Vec<String> = colors.into_iter().map(Into::into).collect();
        if colors.is_empty() {
            return Err(HeatmapError::EmptyScale);
        }
        if let Some(bad) = colors.iter().find(|c| !is_hex_color(c)) {
            return Err(HeatmapError::InvalidColor(bad.clone()));
        }
        Ok(Self { colors })
    }

    /// Tier of a day with `count` posts.
    pub fn tier(&self, count: u32) -> usize {
        (count as usize).min(self.colors.len() - 1)
    }

    /// Colour of a day with `count` posts.
    pub fn color(&self, count: u32) -> &str {
        &self.colors[self.tier(count)]
    }

    /// Colour of a tier, clamped to the last colour.
    pub fn tier_color(&self, tier: usize) -> &str {
        &self.colors[tier.min(self.colors.len() - 1)]
    }

    /// Number of colours.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; a scale holds at least one colour.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The colours, lightest first.
    pub fn colors(&self) -> &[String] {
        &self.colors
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            colors: DEFAULT_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
