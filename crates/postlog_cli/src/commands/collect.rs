//! Collect command implementation.

use postlog_sync_engine::{BlogGateway, Clock, CollectRequest, SyncEngine};
use std::io::Write;

/// Runs the collect command.
pub fn run<G: BlogGateway, C: Clock>(
    engine: &SyncEngine<G, C>,
    request: &CollectRequest,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let log = engine.collect(request)?;
    let stats = engine.stats();

    writeln!(
        out,
        "Saved {} posts over {} days to {}/{}",
        log.total_posts(),
        log.len(),
        request.storage_blog(),
        request.storage_post_id
    )?;
    if let (Some(months), Some(horizon)) = (stats.last_update_range, stats.last_horizon) {
        writeln!(
            out,
            "Recounted {months} month(s) from {horizon}: {} posts counted, {} skipped, {} pages",
            stats.posts_counted, stats.posts_skipped, stats.pages_fetched
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use postlog_testkit::prelude::*;

    #[test]
    fn reports_saved_log() {
        let engine = TestBlog::with_storage("")
            .posts(day(2024, 6, 1), 2, Visibility::Published)
            .posts(day(2024, 6, 2), 1, Visibility::Private)
            .engine(day(2024, 6, 15));
        let mut out = Vec::new();

        run(&engine, &collect_request(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Saved 2 posts over 1 days to aerocode/100"));
        assert!(text.contains("Recounted 12 month(s) from 2023-06-15: 2 posts counted, 1 skipped, 1 pages"));
    }

    #[test]
    fn surfaces_engine_errors() {
        let engine = TestBlog::with_storage("<p>not a log</p>").engine(day(2024, 6, 15));
        let mut out = Vec::new();

        let err = run(&engine, &collect_request(), &mut out).unwrap_err();

        assert!(err.to_string().contains("storage post"));
        assert!(out.is_empty());
    }
}
