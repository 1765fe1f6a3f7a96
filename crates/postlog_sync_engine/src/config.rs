//! Configuration for the sync engine.

use crate::retention::MAX_UPDATE_RANGE;
use crate::visibility::{IncludeMask, WriteVisibility};
use std::time::Duration;

/// Configuration for collect and clear runs.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Which post visibilities are counted.
    pub include_mask: IncludeMask,
    /// Number of posts the listing endpoint returns per page.
    pub page_size: u32,
    /// Pause between consecutive page requests.
    pub page_delay: Duration,
    /// Visibility applied when writing the storage post.
    pub storage_visibility: WriteVisibility,
    /// Title prefix of the storage post; the update time is appended.
    pub title_prefix: String,
    /// Months of history kept in the storage post.
    pub retention_months: u32,
}

impl SyncConfig {
    /// Creates a configuration with the platform defaults.
    pub fn new() -> Self {
        Self {
            include_mask: IncludeMask::default(),
            page_size: 10,
            page_delay: Duration::from_millis(100),
            storage_visibility: WriteVisibility::default(),
            title_prefix: "post-metadata".to_string(),
            retention_months: MAX_UPDATE_RANGE,
        }
    }

    /// Sets the inclusion mask.
    pub fn with_include_mask(mut self, mask: IncludeMask) -> Self {
        self.include_mask = mask;
        self
    }

    /// Sets the listing page size.
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Sets the pause between page requests.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Sets the storage post visibility.
    pub fn with_storage_visibility(mut self, visibility: WriteVisibility) -> Self {
        self.storage_visibility = visibility;
        self
    }

    /// Sets the storage post title prefix.
    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = prefix.into();
        self
    }

    /// Sets the retention length in months.
    pub fn with_retention_months(mut self, months: u32) -> Self {
        self.retention_months = months;
        self
    }

    /// Number of the last listing page for `total_count` posts.
    pub fn last_page(&self, total_count: u32) -> u32 {
        total_count.div_ceil(self.page_size.max(1)).max(1)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}
