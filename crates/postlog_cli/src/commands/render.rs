//! Render command implementation.

use chrono::NaiveDate;
use postlog_codec::{decode, decode_storage, PostLog, CONTAINER_ID};
use postlog_heatmap::{render_svg, CalendarGrid, ColorScale, RenderOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Options of the render command.
#[derive(Debug, Clone)]
pub struct RenderArgs {
    /// Last day of the heat map.
    pub today: NaiveDate,
    /// Custom palette, lightest first; empty selects the default.
    pub colors: Vec<String>,
    /// Whether to print the header.
    pub show_header: bool,
    /// Whether to draw the colour legend.
    pub show_legend: bool,
    /// Output file; stdout when absent.
    pub output: Option<PathBuf>,
}

/// Reads a log from a file holding either bare tokens or a storage post body.
pub fn read_log_file(path: &Path) -> Result<PostLog, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let log = if text.contains(CONTAINER_ID) {
        decode_storage(&text)?
    } else {
        decode(&text)?
    };
    Ok(log)
}

/// Runs the render command.
pub fn run(
    log: &PostLog,
    args: &RenderArgs,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let scale = if args.colors.is_empty() {
        ColorScale::default()
    } else {
        ColorScale::new(args.colors.iter().map(|c| c.trim()))?
    };
    let options = RenderOptions {
        show_header: args.show_header,
        show_legend: args.show_legend,
        ..RenderOptions::default()
    };

    let grid = CalendarGrid::build(log, args.today, &scale);
    let svg = render_svg(&grid, &scale, &options);

    match &args.output {
        Some(path) => {
            std::fs::write(path, &svg)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            info!(path = %path.display(), posts = grid.total_posts(), "wrote heat map");
        }
        None => writeln!(out, "{svg}")?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use postlog_codec::wrap_container;
    use postlog_testkit::prelude::*;
    use tempfile::TempDir;

    fn args(output: Option<PathBuf>) -> RenderArgs {
        RenderArgs {
            today: day(2024, 6, 15),
            colors: Vec::new(),
            show_header: true,
            show_legend: true,
            output,
        }
    }

    #[test]
    fn reads_bare_tokens_and_storage_bodies() {
        let bare = temp_file("2024-06-01:2 2024-06-02:1\n");
        let body = temp_file(&format!("<p>x</p>{}", wrap_container("2024-06-01:2")));

        assert_eq!(read_log_file(bare.path()).unwrap().total_posts(), 3);
        assert_eq!(read_log_file(body.path()).unwrap().total_posts(), 2);
    }

    #[test]
    fn rejects_malformed_file() {
        let bad = temp_file("2024-06-01:0");
        assert!(read_log_file(bad.path()).is_err());
        assert!(read_log_file(Path::new("/nonexistent/postlog.txt")).is_err());
    }

    #[test]
    fn writes_svg_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.svg");
        let log = decode("2024-06-01:2").unwrap();
        let mut out = Vec::new();

        run(&log, &args(Some(path.clone())), &mut out).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("2 posts in the last year"));
        assert!(svg.contains("<title>2 posts on 2024-06-01</title>"));
        assert!(svg.contains(r#"class="legend""#));
        assert!(out.is_empty());
    }

    #[test]
    fn writes_svg_to_stdout_with_custom_colors() {
        let log = decode("2024-06-01:5").unwrap();
        let mut out = Vec::new();
        let mut custom = args(None);
        custom.colors = vec!["#000000".into(), " #ffffff".into()];

        run(&log, &custom, &mut out).unwrap();

        let svg = String::from_utf8(out).unwrap();
        assert!(svg.contains(r##"fill="#ffffff" data-count="5""##));
    }

    #[test]
    fn legend_can_be_hidden() {
        let mut plain = args(None);
        plain.show_legend = false;
        let mut out = Vec::new();

        run(&PostLog::new(), &plain, &mut out).unwrap();

        let svg = String::from_utf8(out).unwrap();
        assert!(!svg.contains("legend"));
        assert!(svg.contains(r#"height="148""#));
    }

    #[test]
    fn invalid_color_is_an_error() {
        let mut custom = args(None);
        custom.colors = vec!["green".into()];
        let mut out = Vec::new();

        assert!(run(&PostLog::new(), &custom, &mut out).is_err());
    }
}
