//! Remote blog gateway abstraction.

use crate::error::{SyncError, SyncResult};
use crate::visibility::{Visibility, WriteVisibility};
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// An authenticated session with the blog platform.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
}

impl Session {
    /// Wraps an access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// The access token sent with every API call.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// One entry of a post listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostSummary {
    /// Calendar day the post was published.
    pub date: NaiveDate,
    /// Visibility of the post.
    pub visibility: Visibility,
}

impl PostSummary {
    /// Creates a summary.
    pub fn new(date: NaiveDate, visibility: Visibility) -> Self {
        Self { date, visibility }
    }
}

/// One page of the post listing, most recent posts first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPage {
    /// Posts on this page.
    pub posts: Vec<PostSummary>,
    /// Total number of posts on the blog as reported by the platform.
    pub total_count: u32,
}

/// A storage post write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePost {
    /// Blog holding the post.
    pub blog: String,
    /// Post id.
    pub post_id: String,
    /// New title.
    pub title: String,
    /// New body.
    pub content: String,
    /// New visibility.
    pub visibility: WriteVisibility,
}

/// The remote blog platform as seen by the sync engine.
///
/// Every call is fallible and is never retried by the engine.
pub trait BlogGateway: Send + Sync {
    /// Opens a session.
    fn authenticate(&self) -> SyncResult<Session>;

    /// Reads the body of a post.
    fn read_post(&self, session: &Session, blog: &str, post_id: &str) -> SyncResult<String>;

    /// Overwrites title, body and visibility of a post.
    fn write_post(&self, session: &Session, post: &WritePost) -> SyncResult<()>;

    /// Fetches one page (1-based) of the blog's posts, most recent first.
    fn list_posts_page(&self, session: &Session, blog: &str, page: u32) -> SyncResult<PostPage>;
}

const MEMORY_TOKEN: &str = "memory-token";

/// A stored post in a [`MemoryGateway`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredPost {
    /// Post title.
    pub title: String,
    /// Post body.
    pub content: String,
    /// Last written visibility.
    pub visibility: Option<WriteVisibility>,
}

/// A deterministic in-memory gateway for tests and dry runs.
#[derive(Debug)]
pub struct MemoryGateway {
    page_size: u32,
    listings: RwLock<HashMap<String, Vec<PostSummary>>>,
    posts: RwLock<HashMap<(String, String), StoredPost>>,
    reported_total: RwLock<Option<u32>>,
    fail_auth: AtomicBool,
    fail_write: AtomicBool,
    fail_read: AtomicBool,
    fail_page: RwLock<Option<u32>>,
    auth_calls: AtomicU32,
    pages_fetched: AtomicU32,
    writes: AtomicU32,
}

impl MemoryGateway {
    /// Creates an empty gateway serving `page_size` posts per page.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            listings: RwLock::new(HashMap::new()),
            posts: RwLock::new(HashMap::new()),
            reported_total: RwLock::new(None),
            fail_auth: AtomicBool::new(false),
            fail_write: AtomicBool::new(false),
            fail_read: AtomicBool::new(false),
            fail_page: RwLock::new(None),
            auth_calls: AtomicU32::new(0),
            pages_fetched: AtomicU32::new(0),
            writes: AtomicU32::new(0),
        }
    }

    /// Publishes a post on `blog`. Listings stay ordered most recent first.
    pub fn add_post(&self, blog: &str, date: NaiveDate, visibility: Visibility) {
        let mut listings = self.listings.write();
        let posts = listings.entry(blog.to_string()).or_default();
        posts.push(PostSummary::new(date, visibility));
        posts.sort_by(|a, b| b.date.cmp(&a.date));
    }

    /// Publishes `count` posts on `date`.
    pub fn add_posts(&self, blog: &str, date: NaiveDate, count: u32, visibility: Visibility) {
        for _ in 0..count {
            self.add_post(blog, date, visibility);
        }
    }

    /// Replaces the listing of `blog` verbatim, keeping the given order.
    pub fn set_listing(&self, blog: &str, posts: Vec<PostSummary>) {
        self.listings.write().insert(blog.to_string(), posts);
    }

    /// Returns the listing of `blog`, most recent first.
    pub fn listing(&self, blog: &str) -> Vec<PostSummary> {
        self.listings.read().get(blog).cloned().unwrap_or_default()
    }

    /// Sets the body of a post, creating it if needed.
    pub fn set_post_content(&self, blog: &str, post_id: &str, content: impl Into<String>) {
        let mut posts = self.posts.write();
        let post = posts
            .entry((blog.to_string(), post_id.to_string()))
            .or_default();
        post.content = content.into();
    }

    /// Returns a stored post.
    pub fn post(&self, blog: &str, post_id: &str) -> Option<StoredPost> {
        self.posts
            .read()
            .get(&(blog.to_string(), post_id.to_string()))
            .cloned()
    }

    /// Returns the body of a stored post.
    pub fn post_content(&self, blog: &str, post_id: &str) -> Option<String> {
        self.post(blog, post_id).map(|p| p.content)
    }

    /// Overrides the total count reported with every page.
    pub fn set_reported_total(&self, total: Option<u32>) {
        *self.reported_total.write() = total;
    }

    /// Makes authentication fail.
    pub fn set_fail_auth(&self, fail: bool) {
        self.fail_auth.store(fail, Ordering::SeqCst);
    }

    /// Makes post reads fail.
    pub fn set_fail_read(&self, fail: bool) {
        self.fail_read.store(fail, Ordering::SeqCst);
    }

    /// Makes post writes fail.
    pub fn set_fail_write(&self, fail: bool) {
        self.fail_write.store(fail, Ordering::SeqCst);
    }

    /// Makes listing fail from `page` on.
    pub fn set_fail_page(&self, page: Option<u32>) {
        *self.fail_page.write() = page;
    }

    /// Number of sessions opened.
    pub fn auth_calls(&self) -> u32 {
        self.auth_calls.load(Ordering::SeqCst)
    }

    /// Number of listing pages served.
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched.load(Ordering::SeqCst)
    }

    /// Number of successful writes.
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_session(session: &Session) -> SyncResult<()> {
        if session.access_token() != MEMORY_TOKEN {
            return Err(SyncError::AuthenticationFailed("unknown access token".into()));
        }
        Ok(())
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new(10)
    }
}

impl BlogGateway for MemoryGateway {
    fn authenticate(&self) -> SyncResult<Session> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_auth.load(Ordering::SeqCst) {
            return Err(SyncError::AuthenticationFailed("invalid credentials".into()));
        }
        Ok(Session::new(MEMORY_TOKEN))
    }

    fn read_post(&self, session: &Session, blog: &str, post_id: &str) -> SyncResult<String> {
        Self::check_session(session)?;
        if self.fail_read.load(Ordering::SeqCst) {
            return Err(SyncError::remote_retryable("read failed"));
        }
        self.post_content(blog, post_id)
            .ok_or_else(|| SyncError::remote_fatal(format!("post {blog}/{post_id} not found")))
    }

    fn write_post(&self, session: &Session, post: &WritePost) -> SyncResult<()> {
        Self::check_session(session)?;
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(SyncError::remote_retryable("write failed"));
        }
        let mut posts = self.posts.write();
        let key = (post.blog.clone(), post.post_id.clone());
        let stored = posts.get_mut(&key).ok_or_else(|| {
            SyncError::remote_fatal(format!("post {}/{} not found", post.blog, post.post_id))
        })?;
        stored.title = post.title.clone();
        stored.content = post.content.clone();
        stored.visibility = Some(post.visibility);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn list_posts_page(&self, session: &Session, blog: &str, page: u32) -> SyncResult<PostPage> {
        Self::check_session(session)?;
        if let Some(fail_from) = *self.fail_page.read() {
            if page >= fail_from {
                return Err(SyncError::remote_retryable(format!("page {page} failed")));
            }
        }
        self.pages_fetched.fetch_add(1, Ordering::SeqCst);

        let listings = self.listings.read();
        let all = listings.get(blog).map(Vec::as_slice).unwrap_or(&[]);
        let start = (page.saturating_sub(1) as usize).saturating_mul(self.page_size as usize);
        let posts = all
            .iter()
            .skip(start)
            .take(self.page_size as usize)
            .copied()
            .collect();
        let reported_total = *self.reported_total.read();
        let total_count = reported_total.unwrap_or(all.len() as u32);

        Ok(PostPage { posts, total_count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn session_debug_hides_token() {
        let session = Session::new("secret-token");
        assert!(!format!("{session:?}").contains("secret-token"));
    }

    #[test]
    fn memory_gateway_pages_most_recent_first() {
        let gateway = MemoryGateway::new(2);
        gateway.add_post("blog", day(2024, 1, 1), Visibility::Published);
        gateway.add_post("blog", day(2024, 1, 3), Visibility::Published);
        gateway.add_post("blog", day(2024, 1, 2), Visibility::Private);

        let session = gateway.authenticate().unwrap();
        let first = gateway.list_posts_page(&session, "blog", 1).unwrap();
        assert_eq!(first.total_count, 3);
        assert_eq!(first.posts[0].date, day(2024, 1, 3));
        assert_eq!(first.posts[1].date, day(2024, 1, 2));

        let second = gateway.list_posts_page(&session, "blog", 2).unwrap();
        assert_eq!(second.posts.len(), 1);
        assert_eq!(gateway.pages_fetched(), 2);
    }

    #[test]
    fn memory_gateway_rejects_foreign_session() {
        let gateway = MemoryGateway::default();
        let result = gateway.read_post(&Session::new("nope"), "blog", "1");
        assert!(matches!(result, Err(SyncError::AuthenticationFailed(_))));
    }

    #[test]
    fn memory_gateway_write_requires_existing_post() {
        let gateway = MemoryGateway::default();
        let session = gateway.authenticate().unwrap();
        let write = WritePost {
            blog: "blog".into(),
            post_id: "7".into(),
            title: "t".into(),
            content: "c".into(),
            visibility: WriteVisibility::Published,
        };
        assert!(gateway.write_post(&session, &write).is_err());

        gateway.set_post_content("blog", "7", "");
        gateway.write_post(&session, &write).unwrap();
        assert_eq!(gateway.post_content("blog", "7").as_deref(), Some("c"));
        assert_eq!(gateway.writes(), 1);
    }

    #[test]
    fn memory_gateway_failure_injection() {
        let gateway = MemoryGateway::default();
        gateway.set_fail_auth(true);
        assert!(gateway.authenticate().is_err());
        gateway.set_fail_auth(false);

        let session = gateway.authenticate().unwrap();
        gateway.set_fail_page(Some(2));
        assert!(gateway.list_posts_page(&session, "blog", 1).is_ok());
        assert!(gateway.list_posts_page(&session, "blog", 2).is_err());
        assert_eq!(gateway.auth_calls(), 2);
    }
}
