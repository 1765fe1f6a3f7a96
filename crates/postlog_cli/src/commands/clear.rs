//! Clear command implementation.

use postlog_sync_engine::{BlogGateway, ClearRequest, Clock, SyncEngine};
use std::io::Write;

/// Runs the clear command.
pub fn run<G: BlogGateway, C: Clock>(
    engine: &SyncEngine<G, C>,
    request: &ClearRequest,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    engine.clear(request)?;
    writeln!(
        out,
        "Cleared {}/{}",
        request.storage_blog, request.storage_post_id
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use postlog_codec::EMPTY_CONTAINER;
    use postlog_testkit::prelude::*;

    #[test]
    fn clears_storage_post() {
        let log = vec![(day(2024, 6, 1), 3)].into_iter().collect();
        let engine = TestBlog::with_log(&log).engine(day(2024, 6, 15));
        let mut out = Vec::new();

        run(&engine, &clear_request(), &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Cleared aerocode/100\n");
        assert_eq!(storage_content(&engine), EMPTY_CONTAINER);
    }

    #[test]
    fn refuses_foreign_post() {
        let engine = TestBlog::with_storage("<h1>About me</h1>").engine(day(2024, 6, 15));
        let mut out = Vec::new();

        let err = run(&engine, &clear_request(), &mut out).unwrap_err();

        assert!(err.to_string().contains("delete its content manually"));
        assert_eq!(storage_content(&engine), "<h1>About me</h1>");
    }

    #[test]
    fn missing_post_id_is_rejected() {
        let engine = TestBlog::with_storage("").engine(day(2024, 6, 15));
        let mut out = Vec::new();

        let err = run(&engine, &ClearRequest::new("aerocode", ""), &mut out).unwrap_err();

        assert!(err.to_string().contains("storage post id is required"));
        assert_eq!(engine.gateway().auth_calls(), 0);
    }
}
