//! Integration tests for collect and clear runs across several days.

use postlog_codec::{wrap_container, EMPTY_CONTAINER};
use postlog_sync_engine::{
    BlogGateway, FixedClock, MemoryGateway, PostPage, Session, SyncConfig, SyncEngine, SyncError,
    SyncResult, SyncState, WritePost,
};
use postlog_testkit::prelude::*;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;
use std::time::Duration;

#[test]
fn daily_runs_pick_up_new_posts() {
    let engine = TestBlog::with_storage("")
        .posts(day(2024, 3, 1), 1, Visibility::Published)
        .posts(day(2024, 6, 14), 2, Visibility::Published)
        .engine(day(2024, 6, 14));
    engine.collect(&collect_request()).unwrap();
    assert_eq!(
        storage_content(&engine),
        wrap_container("2024-03-01:1 2024-06-14:2")
    );

    // The blogger publishes again the same day and the next.
    engine
        .gateway()
        .add_post(TARGET_BLOG, day(2024, 6, 14), Visibility::Published);
    engine
        .gateway()
        .add_post(TARGET_BLOG, day(2024, 6, 15), Visibility::Published);

    let next_day = SyncEngine::with_clock(
        engine.config().clone(),
        clone_gateway(engine.gateway()),
        FixedClock::at_date(day(2024, 6, 15)),
    );
    let log = next_day.collect(&collect_request()).unwrap();

    assert_eq!(log.get(day(2024, 6, 14)), 3);
    assert_eq!(log.get(day(2024, 6, 15)), 1);
    assert_eq!(log.get(day(2024, 3, 1)), 1);
}

#[test]
fn wider_update_range_repairs_older_days() {
    let stale = wrap_container("2024-03-01:9 2024-06-01:1");
    let engine = TestBlog::with_storage(&stale)
        .posts(day(2024, 3, 1), 2, Visibility::Published)
        .posts(day(2024, 6, 1), 1, Visibility::Published)
        .engine(day(2024, 6, 15));

    let narrow = engine.collect(&collect_request()).unwrap();
    assert_eq!(narrow.get(day(2024, 3, 1)), 9);

    let wide = engine
        .collect(&collect_request().with_update_range(6))
        .unwrap();
    assert_eq!(wide.get(day(2024, 3, 1)), 2);
    assert_eq!(engine.stats().last_update_range, Some(6));
}

#[test]
fn clear_then_collect_rebuilds_the_year() {
    let engine = TestBlog::with_storage(&wrap_container("2024-06-01:5"))
        .posts(day(2023, 9, 1), 1, Visibility::Published)
        .posts(day(2024, 6, 1), 2, Visibility::Published)
        .engine(day(2024, 6, 15));

    engine.clear(&clear_request()).unwrap();
    assert_eq!(storage_content(&engine), EMPTY_CONTAINER);

    let log = engine.collect(&collect_request()).unwrap();
    assert_eq!(log.get(day(2023, 9, 1)), 1);
    assert_eq!(log.get(day(2024, 6, 1)), 2);
    assert_eq!(engine.stats().runs_completed, 2);
}

#[test]
fn storage_post_with_surrounding_markup() {
    let body = format!(
        "<p>Do not edit.</p>{}<p>footer</p>",
        wrap_container("2024-06-01:1")
    );
    let engine = TestBlog::with_storage(&body)
        .posts(day(2024, 6, 10), 1, Visibility::Published)
        .engine(day(2024, 6, 15));

    let log = engine.collect(&collect_request()).unwrap();
    assert_eq!(log.get(day(2024, 6, 10)), 1);
    assert_eq!(log.get(day(2024, 6, 1)), 0);
}

#[test]
fn write_failure_leaves_storage_untouched() {
    let original = wrap_container("2024-01-01:1");
    let engine = TestBlog::with_storage(&original)
        .posts(day(2024, 6, 1), 1, Visibility::Published)
        .engine(day(2024, 6, 15));
    engine.gateway().set_fail_write(true);

    let err = engine.collect(&collect_request()).unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(storage_content(&engine), original);
    assert_eq!(engine.state(), SyncState::Failed);

    engine.gateway().set_fail_write(false);
    engine.collect(&collect_request()).unwrap();
    assert_eq!(engine.state(), SyncState::Done);
}

/// Blocks inside the first listing call until released.
struct BlockingGateway {
    inner: MemoryGateway,
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl BlogGateway for BlockingGateway {
    fn authenticate(&self) -> SyncResult<Session> {
        self.inner.authenticate()
    }

    fn read_post(&self, session: &Session, blog: &str, post_id: &str) -> SyncResult<String> {
        self.inner.read_post(session, blog, post_id)
    }

    fn write_post(&self, session: &Session, post: &WritePost) -> SyncResult<()> {
        self.inner.write_post(session, post)
    }

    fn list_posts_page(&self, session: &Session, blog: &str, page: u32) -> SyncResult<PostPage> {
        let _ = self.entered.lock().unwrap().send(());
        let _ = self
            .release
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(5));
        self.inner.list_posts_page(session, blog, page)
    }
}

#[test]
fn second_run_is_rejected_while_one_is_active() {
    let (entered_tx, entered_rx) = channel();
    let (release_tx, release_rx) = channel();
    let inner = MemoryGateway::default();
    inner.set_post_content(TARGET_BLOG, STORAGE_POST_ID, "");
    let engine = SyncEngine::with_clock(
        SyncConfig::new().with_page_delay(Duration::ZERO),
        BlockingGateway {
            inner,
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        },
        FixedClock::at_date(day(2024, 6, 15)),
    );

    std::thread::scope(|scope| {
        let running = scope.spawn(|| engine.collect(&collect_request()));
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert_eq!(engine.state(), SyncState::Paginating);
        let second = engine.clear(&clear_request());
        assert!(matches!(
            second,
            Err(SyncError::InvalidStateTransition { .. })
        ));

        release_tx.send(()).unwrap();
        assert!(running.join().unwrap().is_ok());
    });

    assert_eq!(engine.state(), SyncState::Done);
    assert_eq!(engine.stats().runs_completed, 1);
}

fn clone_gateway(source: &MemoryGateway) -> MemoryGateway {
    let copy = MemoryGateway::default();
    if let Some(post) = source.post(TARGET_BLOG, STORAGE_POST_ID) {
        copy.set_post_content(TARGET_BLOG, STORAGE_POST_ID, post.content);
    }
    copy.set_listing(TARGET_BLOG, source.listing(TARGET_BLOG));
    copy
}
