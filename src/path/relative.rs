//! Relative path views over absolute paths

use super::{
    compare_first_segments, file_name, is_file_separator, is_prefix, length_of_common_prefix,
    CaseSensitivity,
};
use std::cmp::Ordering;
use std::fmt;

/// A suffix of an absolute path, relative to some node in the hierarchy.
///
/// Descending the tree only moves `offset` forward; the underlying string is never
/// copied. An empty view denotes the node itself (or the file system root).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VfsRelativePath<'a> {
    absolute_path: &'a str,
    offset: usize,
}

impl<'a> VfsRelativePath<'a> {
    /// Relative path from the file system root.
    ///
    /// Trailing separators are dropped and leading separators skipped, so `/a/b/`,
    /// `C:\a` and `\\server\share` all start at their first real segment.
    pub fn of(absolute_path: &'a str) -> Self {
        let normalized = absolute_path.trim_end_matches(is_file_separator);
        let offset = normalized
            .find(|c: char| !is_file_separator(c))
            .unwrap_or(normalized.len());
        VfsRelativePath {
            absolute_path: normalized,
            offset,
        }
    }

    /// The absolute path this view was created from, without trailing separators.
    pub fn absolute_path(&self) -> &'a str {
        self.absolute_path
    }

    pub fn as_str(&self) -> &'a str {
        &self.absolute_path[self.offset..]
    }

    pub fn len(&self) -> usize {
        self.absolute_path.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn file_name(&self) -> &'a str {
        file_name(self.as_str())
    }

    /// The remainder of this path below `child_path`, which must be a prefix of it.
    pub fn path_from_child(&self, child_path: &str) -> Self {
        debug_assert!(
            child_path.len() <= self.len(),
            "child path '{}' is longer than '{}'",
            child_path,
            self.as_str()
        );
        let offset = (self.offset + child_path.len() + 1).min(self.absolute_path.len());
        VfsRelativePath {
            absolute_path: self.absolute_path,
            offset,
        }
    }

    pub fn suffix_starting_from(&self, start: usize) -> Self {
        VfsRelativePath {
            absolute_path: self.absolute_path,
            offset: (self.offset + start).min(self.absolute_path.len()),
        }
    }

    pub fn length_of_common_prefix(&self, other: &str, case_sensitivity: CaseSensitivity) -> usize {
        length_of_common_prefix(other, self.as_str(), case_sensitivity)
    }

    /// Orders the first segment of this path relative to the first segment of `other`.
    pub fn compare_to_first_segment(
        &self,
        other: &str,
        case_sensitivity: CaseSensitivity,
    ) -> Ordering {
        if self.is_empty() {
            return Ordering::Equal;
        }
        compare_first_segments(self.as_str(), other, case_sensitivity)
    }

    /// Whether this path is `prefix` or lies below it.
    pub fn has_prefix(&self, prefix: &str, case_sensitivity: CaseSensitivity) -> bool {
        is_prefix(prefix, self.as_str(), case_sensitivity)
    }

    /// Whether `other` is this path or lies below it.
    pub fn is_prefix_of(&self, other: &str, case_sensitivity: CaseSensitivity) -> bool {
        is_prefix(self.as_str(), other, case_sensitivity)
    }
}

impl fmt::Display for VfsRelativePath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
