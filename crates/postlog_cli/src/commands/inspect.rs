//! Inspect command implementation.

use chrono::NaiveDate;
use postlog_codec::PostLog;
use postlog_sync_engine::{BlogGateway, ClearRequest, Clock, SyncEngine};
use serde::Serialize;
use std::io::Write;

/// Storage post inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Blog holding the storage post.
    pub blog: String,
    /// Id of the storage post.
    pub post_id: String,
    /// Number of days with posts.
    pub days: usize,
    /// Number of posts.
    pub total_posts: u64,
    /// Earliest day with posts.
    pub first_date: Option<NaiveDate>,
    /// Latest day with posts.
    pub last_date: Option<NaiveDate>,
    /// The stored log.
    pub log: PostLog,
}

impl InspectResult {
    fn new(request: &ClearRequest, log: PostLog) -> Self {
        Self {
            blog: request.storage_blog.clone(),
            post_id: request.storage_post_id.clone(),
            days: log.len(),
            total_posts: log.total_posts(),
            first_date: log.first_date(),
            last_date: log.last_date(),
            log,
        }
    }
}

/// Runs the inspect command.
pub fn run<G: BlogGateway, C: Clock>(
    engine: &SyncEngine<G, C>,
    request: &ClearRequest,
    format: &str,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = InspectResult::new(request, engine.load_log(request)?);

    match format {
        "json" => {
            writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        }
        _ => {
            print_text_output(&result, out)?;
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult, out: &mut dyn Write) -> std::io::Result<()> {
    let show = |date: Option<NaiveDate>| date.map_or_else(|| "-".to_string(), |d| d.to_string());

    writeln!(out, "Storage post: {}/{}", result.blog, result.post_id)?;
    writeln!(out, "Days:         {}", result.days)?;
    writeln!(out, "Total posts:  {}", result.total_posts)?;
    writeln!(out, "First day:    {}", show(result.first_date))?;
    writeln!(out, "Last day:     {}", show(result.last_date))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use postlog_testkit::prelude::*;

    fn engine() -> TestEngine {
        let log = vec![(day(2024, 5, 1), 2), (day(2024, 6, 1), 1)]
            .into_iter()
            .collect();
        TestBlog::with_log(&log).engine(day(2024, 6, 15))
    }

    #[test]
    fn text_output() {
        let engine = engine();
        let mut out = Vec::new();

        run(&engine, &clear_request(), "text", &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Storage post: aerocode/100"));
        assert!(text.contains("Days:         2"));
        assert!(text.contains("Total posts:  3"));
        assert!(text.contains("First day:    2024-05-01"));
        assert!(text.contains("Last day:     2024-06-01"));
        assert_eq!(engine.gateway().writes(), 0);
    }

    #[test]
    fn json_output() {
        let engine = engine();
        let mut out = Vec::new();

        run(&engine, &clear_request(), "json", &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["total_posts"], 3);
        assert_eq!(value["first_date"], "2024-05-01");
        assert_eq!(value["log"]["2024-05-01"], 2);
    }

    #[test]
    fn empty_storage() {
        let engine = TestBlog::with_storage("").engine(day(2024, 6, 15));
        let mut out = Vec::new();

        run(&engine, &clear_request(), "text", &mut out).unwrap();

        assert!(String::from_utf8(out).unwrap().contains("First day:    -"));
    }
}
