//! Post visibility and the inclusion mask.

use crate::error::{SyncError, SyncResult};
use std::fmt;
use std::str::FromStr;

/// Visibility of a post on the target blog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Only the author can see the post.
    Private,
    /// Readable with a password.
    Protected,
    /// Public.
    Published,
}

impl Visibility {
    /// Maps the platform's listing code (`0`, `15`, `20`).
    ///
    /// Unknown codes are treated as private.
    pub fn from_api_code(code: &str) -> Self {
        match code.trim() {
            "15" => Visibility::Protected,
            "20" => Visibility::Published,
            _ => Visibility::Private,
        }
    }

    /// Position of this visibility in an [`IncludeMask`] string.
    fn mask_index(self) -> usize {
        match self {
            Visibility::Private => 0,
            Visibility::Protected => 1,
            Visibility::Published => 2,
        }
    }
}

/// Visibility to apply when writing the storage post.
///
/// The write endpoint uses its own codes, different from the listing codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteVisibility {
    /// Only the author can see the storage post.
    Private,
    /// Readable with a password.
    Protected,
    /// Public, so the widget can read it without credentials.
    #[default]
    Published,
}

impl WriteVisibility {
    /// Code sent to the write endpoint.
    pub fn api_code(self) -> &'static str {
        match self {
            WriteVisibility::Private => "0",
            WriteVisibility::Protected => "1",
            WriteVisibility::Published => "3",
        }
    }
}

/// Which visibilities are counted, as the 3-character string
/// `{private}{protected}{published}` of `0`/`1` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncludeMask {
    flags: [bool; 3],
}

impl IncludeMask {
    /// Mask that counts only published posts (`"001"`).
    pub const PUBLISHED_ONLY: IncludeMask = IncludeMask {
        flags: [false, false, true],
    };

    /// Mask that counts every post (`"111"`).
    pub const ALL: IncludeMask = IncludeMask { flags: [true; 3] };

    /// Returns true if posts with `visibility` are counted.
    pub fn includes(&self, visibility: Visibility) -> bool {
        self.flags[visibility.mask_index()]
    }
}

impl Default for IncludeMask {
    fn default() -> Self {
        Self::PUBLISHED_ONLY
    }
}

impl FromStr for IncludeMask {
    type Err = SyncError;

    fn from_str(s: &str) -> SyncResult<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| matches!(b, b'0' | b'1')) {
            return Err(SyncError::Configuration(format!(
                "include mask must be three characters of 0 or 1: {s:?}"
            )));
        }
        Ok(IncludeMask {
            flags: [bytes[0] == b'1', bytes[1] == b'1', bytes[2] == b'1'],
        })
    }
}

impl fmt::Display for IncludeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for flag in self.flags {
            f.write_str(if flag { "1" } else { "0" })?;
        }
        Ok(())
    }
}
