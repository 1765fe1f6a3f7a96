//! Test fixtures and gateway helpers.
//!
//! Provides a seeded in-memory blog and an engine with a frozen clock, so
//! collect runs are deterministic.

use chrono::NaiveDate;
use postlog_codec::{encode_storage, PostLog};
use postlog_sync_engine::{
    ClearRequest, CollectRequest, FixedClock, MemoryGateway, PostSummary, SyncConfig, SyncEngine,
    Visibility,
};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Blog whose posts are counted in fixtures.
pub const TARGET_BLOG: &str = "aerocode";

/// Id of the storage post in fixtures.
pub const STORAGE_POST_ID: &str = "100";

/// Engine type used by fixtures.
pub type TestEngine = SyncEngine<MemoryGateway, FixedClock>;

/// Shorthand for a calendar day.
pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// A blog with a storage post and a post listing.
#[derive(Debug)]
pub struct TestBlog {
    gateway: MemoryGateway,
    page_size: u32,
}

impl TestBlog {
    /// Blog whose storage post holds `content`.
    pub fn with_storage(content: &str) -> Self {
        Self::paged(content, 10)
    }

    /// Blog whose storage post holds the encoded `log`.
    pub fn with_log(log: &PostLog) -> Self {
        Self::with_storage(&encode_storage(log))
    }

    /// Blog serving `page_size` posts per listing page.
    pub fn paged(content: &str, page_size: u32) -> Self {
        let gateway = MemoryGateway::new(page_size);
        gateway.set_post_content(TARGET_BLOG, STORAGE_POST_ID, content);
        Self { gateway, page_size }
    }

    /// Publishes `count` posts on `date`.
    pub fn posts(self, date: NaiveDate, count: u32, visibility: Visibility) -> Self {
        self.gateway.add_posts(TARGET_BLOG, date, count, visibility);
        self
    }

    /// Replaces the listing, most recent first.
    pub fn listing(self, posts: Vec<PostSummary>) -> Self {
        self.gateway.set_listing(TARGET_BLOG, posts);
        self
    }

    /// Returns the gateway.
    pub fn gateway(&self) -> &MemoryGateway {
        &self.gateway
    }

    /// Builds an engine frozen at midday on `today` with no page delay.
    pub fn engine(self, today: NaiveDate) -> TestEngine {
        self.engine_with(SyncConfig::new(), today)
    }

    /// Builds an engine from `config`, keeping the blog's page size.
    pub fn engine_with(self, config: SyncConfig, today: NaiveDate) -> TestEngine {
        let config = config
            .with_page_size(self.page_size)
            .with_page_delay(Duration::ZERO);
        SyncEngine::with_clock(config, self.gateway, FixedClock::at_date(today))
    }
}

/// Collect request for the fixture blog.
pub fn collect_request() -> CollectRequest {
    CollectRequest::new(TARGET_BLOG, STORAGE_POST_ID)
}

/// Clear request for the fixture blog.
pub fn clear_request() -> ClearRequest {
    ClearRequest::new(TARGET_BLOG, STORAGE_POST_ID)
}

/// Body of the fixture storage post.
pub fn storage_content(engine: &TestEngine) -> String {
    engine
        .gateway()
        .post_content(TARGET_BLOG, STORAGE_POST_ID)
        .expect("storage post exists")
}

/// Writes `contents` to a temporary file that lives as long as the handle.
pub fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp file");
    file
}
