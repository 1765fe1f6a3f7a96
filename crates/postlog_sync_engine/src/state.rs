//! Sync engine state machine.

use crate::clock::{Clock, SystemClock};
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::gateway::{BlogGateway, Session, WritePost};
use crate::request::{ClearRequest, CollectRequest};
use crate::retention::{months_before, RetentionPolicy};
use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::RwLock;
use postlog_codec::{decode_storage, encode_storage, PostLog, EMPTY_CONTAINER};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The current state of a collect or clear run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No run has started yet.
    Idle,
    /// Reading and decoding the storage post.
    Loading,
    /// Dropping the recomputed window from the stored log.
    Windowing,
    /// Walking the post listing of the target blog.
    Paginating,
    /// Combining kept and recounted days.
    Merging,
    /// Writing the storage post.
    Saving,
    /// The last run completed.
    Done,
    /// The last run failed.
    Failed,
}

impl SyncState {
    /// Returns true while a run is in flight.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            SyncState::Loading
                | SyncState::Windowing
                | SyncState::Paginating
                | SyncState::Merging
                | SyncState::Saving
        )
    }

    /// Returns true if a new run may start.
    pub fn can_start(&self) -> bool {
        matches!(self, SyncState::Idle | SyncState::Done | SyncState::Failed)
    }
}

/// Statistics accumulated over the runs of one engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Collect and clear runs that completed.
    pub runs_completed: u64,
    /// Listing pages fetched.
    pub pages_fetched: u64,
    /// Posts counted into the log.
    pub posts_counted: u64,
    /// Posts skipped by the visibility mask.
    pub posts_skipped: u64,
    /// Update range applied by the last collect run.
    pub last_update_range: Option<u32>,
    /// Window start of the last collect run.
    pub last_horizon: Option<NaiveDate>,
    /// Clock reading at the end of the last successful run.
    pub last_run_at: Option<NaiveDateTime>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Counts from walking the listing.
#[derive(Debug, Default)]
struct PageWalk {
    pages: u64,
    counted: u64,
    skipped: u64,
}

/// Collects the post history of a blog into a storage post.
///
/// Runs are sequential and never retried; a failed run writes nothing.
pub struct SyncEngine<G: BlogGateway, C: Clock = SystemClock> {
    config: SyncConfig,
    gateway: Arc<G>,
    clock: C,
    retention: RetentionPolicy,
    state: RwLock<SyncState>,
    stats: RwLock<SyncStats>,
}

impl<G: BlogGateway> SyncEngine<G, SystemClock> {
    /// Creates an engine reading the system clock in the default zone.
    pub fn new(config: SyncConfig, gateway: G) -> Self {
        Self::with_clock(config, gateway, SystemClock::default())
    }
}

impl<G: BlogGateway, C: Clock> SyncEngine<G, C> {
    /// Creates an engine with an explicit clock.
    pub fn with_clock(config: SyncConfig, gateway: G, clock: C) -> Self {
        let retention = RetentionPolicy::new(config.retention_months);
        Self {
            config,
            gateway: Arc::new(gateway),
            clock,
            retention,
            state: RwLock::new(SyncState::Idle),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    /// Gets the current state.
    pub fn state(&self) -> SyncState {
        *self.state.read()
    }

    /// Gets the current stats.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Gets the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Gets the gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Recounts the trailing window of the target blog and saves the log.
    ///
    /// Returns the log that was written.
    pub fn collect(&self, request: &CollectRequest) -> SyncResult<PostLog> {
        request.validate()?;
        self.begin("collect")?;
        let result = self.run_collect(request);
        self.finish(result)
    }

    /// Resets the storage post to the empty log.
    ///
    /// The post is loaded and decoded first; a post that does not hold a log
    /// is never overwritten.
    pub fn clear(&self, request: &ClearRequest) -> SyncResult<()> {
        request.validate()?;
        self.begin("clear")?;
        let result = self.run_clear(request);
        self.finish(result)
    }

    /// Reads and decodes the storage post without writing anything.
    pub fn load_log(&self, request: &ClearRequest) -> SyncResult<PostLog> {
        request.validate()?;
        let session = self.gateway.authenticate()?;
        self.load(&session, request)
    }

    fn run_collect(&self, request: &CollectRequest) -> SyncResult<PostLog> {
        let storage = request.storage();
        let today = self.clock.today();

        let session = self.gateway.authenticate()?;
        let mut log = self.load(&session, &storage)?;
        let expired = self.retention.drop_expired(&mut log, today);
        if expired > 0 {
            debug!(expired, "dropped days past retention");
        }

        self.set_state(SyncState::Windowing);
        let update_range = self
            .retention
            .update_range(request.update_range, log.is_empty());
        let horizon = months_before(today, update_range);
        let recounted = RetentionPolicy::cut_window(&mut log, horizon);
        info!(
            update_range,
            %horizon,
            recounted,
            "recounting window"
        );

        self.set_state(SyncState::Paginating);
        let mut window = PostLog::new();
        let walk = self.count_window(&session, &request.target_blog, horizon, &mut window)?;

        self.set_state(SyncState::Merging);
        log.extend(window.iter());
        info!(
            days = log.len(),
            posts = log.total_posts(),
            "merged post log"
        );

        self.set_state(SyncState::Saving);
        let title = format!(
            "{} (updated at {})",
            self.config.title_prefix,
            self.clock.now().format("%Y-%m-%d %H:%M:%S")
        );
        self.gateway.write_post(
            &session,
            &WritePost {
                blog: storage.storage_blog.clone(),
                post_id: storage.storage_post_id.clone(),
                title,
                content: encode_storage(&log),
                visibility: self.config.storage_visibility,
            },
        )?;
        info!(
            blog = %storage.storage_blog,
            post_id = %storage.storage_post_id,
            "saved post log"
        );

        let mut stats = self.stats.write();
        stats.pages_fetched += walk.pages;
        stats.posts_counted += walk.counted;
        stats.posts_skipped += walk.skipped;
        stats.last_update_range = Some(update_range);
        stats.last_horizon = Some(horizon);

        Ok(log)
    }

    fn run_clear(&self, request: &ClearRequest) -> SyncResult<()> {
        let session = self.gateway.authenticate()?;
        self.load(&session, request).map_err(|e| match e {
            SyncError::MalformedStorage { source } => SyncError::NotStoragePost { source },
            other => other,
        })?;

        self.set_state(SyncState::Saving);
        let title = format!(
            "{} (cleared at {})",
            self.config.title_prefix,
            self.clock.now().format("%Y-%m-%d %H:%M:%S")
        );
        self.gateway.write_post(
            &session,
            &WritePost {
                blog: request.storage_blog.clone(),
                post_id: request.storage_post_id.clone(),
                title,
                content: EMPTY_CONTAINER.to_string(),
                visibility: self.config.storage_visibility,
            },
        )?;
        info!(
            blog = %request.storage_blog,
            post_id = %request.storage_post_id,
            "cleared post log"
        );
        Ok(())
    }

    fn load(&self, session: &Session, storage: &ClearRequest) -> SyncResult<PostLog> {
        let content =
            self.gateway
                .read_post(session, &storage.storage_blog, &storage.storage_post_id)?;
        let log = decode_storage(&content)?;
        debug!(days = log.len(), "loaded post log");
        Ok(log)
    }

    /// Walks the listing most recent first, counting posts on or after `horizon`.
    fn count_window(
        &self,
        session: &Session,
        blog: &str,
        horizon: NaiveDate,
        window: &mut PostLog,
    ) -> SyncResult<PageWalk> {
        let mask = self.config.include_mask;
        let mut walk = PageWalk::default();
        let mut page = 1;

        loop {
            let listing = self.gateway.list_posts_page(session, blog, page)?;
            walk.pages += 1;
            let last_page = self.config.last_page(listing.total_count);
            debug!(page, last_page, posts = listing.posts.len(), "fetched page");

            if listing.posts.is_empty() {
                if page < last_page {
                    warn!(page, last_page, "empty page before the reported last page");
                }
                break;
            }

            for post in &listing.posts {
                if post.date < horizon {
                    info!(stop_date = %post.date, page, "reached posts before the window");
                    return Ok(walk);
                }
                if !mask.includes(post.visibility) {
                    debug!(date = %post.date, visibility = ?post.visibility, "skipped by mask");
                    walk.skipped += 1;
                    continue;
                }
                window.increment(post.date);
                walk.counted += 1;
            }

            if page >= last_page {
                break;
            }
            page += 1;
            if !self.config.page_delay.is_zero() {
                std::thread::sleep(self.config.page_delay);
            }
        }

        Ok(walk)
    }

    fn begin(&self, run: &str) -> SyncResult<()> {
        let mut state = self.state.write();
        if !state.can_start() {
            return Err(SyncError::InvalidStateTransition {
                from: format!("{:?}", *state),
                to: run.to_string(),
            });
        }
        *state = SyncState::Loading;
        Ok(())
    }

    fn finish<T>(&self, result: SyncResult<T>) -> SyncResult<T> {
        match &result {
            Ok(_) => {
                self.set_state(SyncState::Done);
                let mut stats = self.stats.write();
                stats.runs_completed += 1;
                stats.last_run_at = Some(self.clock.now());
                stats.last_error = None;
            }
            Err(e) => {
                self.set_state(SyncState::Failed);
                self.stats.write().last_error = Some(e.to_string());
                warn!(error = %e, "run failed");
            }
        }
        result
    }

    fn set_state(&self, state: SyncState) {
        *self.state.write() = state;
    }
}
