//! Archive path normalization.
//!
//! Requests may address the archive with any path-like string. Before a path is used to scope a
//! query it is normalized into a single canonical prefix:
//!
//! * it always begins with a separator
//! * runs of separators are collapsed into one
//! * there is no trailing separator, unless the path is exactly the root
//!
//! An absent or empty path means "no path", in which case queries cover the whole archive.

use std::fmt;

use serde::Serialize;

/// Path component separator
pub const SEPARATOR: char = '/';

/// A normalized archive path prefix.
///
/// Construct with [normalize]. The root path `/` is a valid, present path and must not be confused
/// with the absence of a path.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ArchivePath(String);

impl ArchivePath {
    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether this is the archive root.
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Returns the number of components in the path.
    ///
    /// The root has depth 0, `/badc` has depth 1, `/badc/data` has depth 2.
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.matches(SEPARATOR).count()
        }
    }
}

impl fmt::Display for ArchivePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArchivePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Normalize a raw path into an [ArchivePath].
///
/// Returns `None` when `raw` is absent or empty. Any other input, including one made only of
/// separators, produces a path.
///
/// # Arguments
///
/// * `raw`: Optional path as supplied by the caller
pub fn normalize(raw: Option<&str>) -> Option<ArchivePath> {
    let raw = raw.filter(|raw| !raw.is_empty())?;
    let mut normalized = String::with_capacity(raw.len() + 1);
    for component in raw.split(SEPARATOR).filter(|c| !c.is_empty()) {
        normalized.push(SEPARATOR);
        normalized.push_str(component);
    }
    if normalized.is_empty() {
        normalized.push(SEPARATOR);
    }
    Some(ArchivePath(normalized))
}
