//! The storage-post container that carries a serialized log.
//!
//! A storage post is an ordinary blog post whose body holds the encoded log
//! as the text of a single `<div id="__LOG_DATA__">` element. The platform's
//! editor may wrap that element in other markup, so extraction scans the
//! whole body for the id instead of expecting an exact string.

use crate::decoder::decode;
use crate::error::{CodecError, CodecResult};
use crate::log::PostLog;
use lol_html::{element, rewrite_str, text, RewriteStrSettings};
use std::cell::RefCell;
use std::rc::Rc;

/// Element id of the log container.
pub const CONTAINER_ID: &str = "__LOG_DATA__";

/// Canonical body of a storage post holding an empty log.
pub const EMPTY_CONTAINER: &str = "<div id=\"__LOG_DATA__\"></div>";

/// Wrap encoded log text in the container element.
pub fn wrap_container(serialized: &str) -> String {
    format!("<div id=\"{CONTAINER_ID}\">{serialized}</div>")
}

/// Returns true if `content` is an empty post or the canonical empty container.
pub fn is_empty_storage(content: &str) -> bool {
    let trimmed = content.trim();
    trimmed.is_empty() || trimmed == EMPTY_CONTAINER
}

#[derive(Default)]
struct Scan {
    found: bool,
    text: String,
}

/// Extract the raw text of the container element from a post body.
///
/// # Errors
///
/// Returns [`CodecError::MissingContainer`] if no element carries
/// [`CONTAINER_ID`], or [`CodecError::Html`] if the body cannot be scanned.
pub fn extract_container(content: &str) -> CodecResult<String> {
    let scan = Rc::new(RefCell::new(Scan::default()));
    let selector = format!("#{CONTAINER_ID}");

    rewrite_str(
        content,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!(selector.as_str(), {
                    let scan = Rc::clone(&scan);
                    move |_el| {
                        scan.borrow_mut().found = true;
                        Ok(())
                    }
                }),
                text!(selector.as_str(), {
                    let scan = Rc::clone(&scan);
                    move |t| {
                        scan.borrow_mut().text.push_str(t.as_str());
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| CodecError::Html {
        message: err.to_string(),
    })?;

    let scan = scan.borrow();
    if !scan.found {
        return Err(CodecError::MissingContainer { id: CONTAINER_ID });
    }
    Ok(scan.text.clone())
}

/// Decode the log stored in a storage post body.
///
/// An empty body or the canonical empty container yields an empty log.
///
/// # Errors
///
/// Propagates container extraction and token decoding errors; a post that
/// does not hold a valid log must never be treated as empty.
pub fn decode_storage(content: &str) -> CodecResult<PostLog> {
    if is_empty_storage(content) {
        return Ok(PostLog::new());
    }
    let text = extract_container(content)?;
    decode(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn wraps_in_container() {
        assert_eq!(wrap_container(""), EMPTY_CONTAINER);
        assert_eq!(
            wrap_container("2024-01-01:1"),
            "<div id=\"__LOG_DATA__\">2024-01-01:1</div>"
        );
    }

    #[test]
    fn empty_storage_variants() {
        assert!(is_empty_storage(""));
        assert!(is_empty_storage(EMPTY_CONTAINER));
        assert!(is_empty_storage("  <div id=\"__LOG_DATA__\"></div>\n"));
        assert!(!is_empty_storage("<p>hello</p>"));
    }

    #[test]
    fn extracts_nested_container() {
        let body = "<p>intro</p><figure><div id=\"__LOG_DATA__\">2024-01-01:2</div></figure>";
        assert_eq!(extract_container(body).unwrap(), "2024-01-01:2");
    }

    #[test]
    fn missing_container_is_error() {
        assert_eq!(
            extract_container("<p>my diary</p>"),
            Err(CodecError::MissingContainer { id: CONTAINER_ID })
        );
    }

    #[test]
    fn decode_storage_reads_log() {
        let log = decode_storage(&wrap_container("2024-01-01:2 2024-01-02:1")).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(log.get(day), 2);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn decode_storage_rejects_ordinary_post() {
        assert!(decode_storage("<p>my diary</p>").is_err());
        assert!(matches!(
            decode_storage("<div id=\"__LOG_DATA__\">dear diary</div>"),
            Err(CodecError::MalformedToken { .. })
        ));
    }
}
