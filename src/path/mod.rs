//! Path comparison for the snapshot trie
//!
//! All comparisons work on `&str` paths and never allocate. Separators sort before
//! every other character, so ordering full paths is the same as ordering their
//! segment lists. Characters are compared case-folded first; in case-sensitive mode
//! the raw character order of the first case-only difference breaks ties, which
//! keeps `A` and `a` adjacent but distinct.
//!
//! Two characters are only considered equal ignoring case when their UTF-8 widths
//! match. This keeps byte offsets aligned between two paths that compare equal, so
//! a common prefix length can be used to slice either of them.

pub mod relative;
pub mod tracker;

pub use relative::VfsRelativePath;
pub use tracker::RelativePathTracker;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Case sensitivity of the file system hosting the snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseSensitivity {
    CaseSensitive,
    CaseInsensitive,
}

impl CaseSensitivity {
    /// Convention of the host OS: Windows and macOS file systems ignore case by default.
    pub fn for_current_os() -> Self {
        if cfg!(any(windows, target_os = "macos")) {
            CaseSensitivity::CaseInsensitive
        } else {
            CaseSensitivity::CaseSensitive
        }
    }

    pub fn is_case_sensitive(self) -> bool {
        self == CaseSensitivity::CaseSensitive
    }
}

pub fn is_file_separator(c: char) -> bool {
    std::path::is_separator(c)
}

/// Last segment of a path, e.g. `c` for `/a/b/c`.
pub fn file_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(is_file_separator);
    match trimmed.rfind(is_file_separator) {
        Some(index) => &trimmed[index + 1..],
        None => trimmed,
    }
}

fn fold_case(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    let upper = single_char(c.to_uppercase()).unwrap_or(c);
    single_char(upper.to_lowercase()).unwrap_or(upper)
}

fn single_char(mut chars: impl Iterator<Item = char>) -> Option<char> {
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Orders two characters ignoring case. Separators are smaller than anything else.
pub fn compare_chars_ignoring_case(c1: char, c2: char) -> Ordering {
    if c1 == c2 {
        return Ordering::Equal;
    }
    match (is_file_separator(c1), is_file_separator(c2)) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => (fold_case(c1), c1.len_utf8()).cmp(&(fold_case(c2), c2.len_utf8())),
    }
}

pub fn equal_chars(c1: char, c2: char, case_sensitivity: CaseSensitivity) -> bool {
    if c1 == c2 {
        return true;
    }
    match case_sensitivity {
        CaseSensitivity::CaseSensitive => false,
        CaseSensitivity::CaseInsensitive => {
            compare_chars_ignoring_case(c1, c2) == Ordering::Equal
        }
    }
}

/// Accumulates the tie-break for two paths that are equal ignoring case.
///
/// Only the first case-only difference counts, and only in case-sensitive mode.
fn compute_combined_compare(
    previous: Ordering,
    c1: char,
    c2: char,
    case_sensitivity: CaseSensitivity,
) -> Ordering {
    if !case_sensitivity.is_case_sensitive() || previous != Ordering::Equal {
        return previous;
    }
    c1.cmp(&c2)
}

/// Total order over full relative paths, used to keep child entries sorted.
///
/// Segments are compared one at a time, each ignoring case first and then by the
/// case tie-break, so the order agrees with `compare_first_segments` whenever the
/// first segments differ.
pub fn compare_paths(path1: &str, path2: &str, case_sensitivity: CaseSensitivity) -> Ordering {
    let mut combined = Ordering::Equal;
    let mut chars1 = path1.chars();
    let mut chars2 = path2.chars();
    loop {
        match (chars1.next(), chars2.next()) {
            (Some(c1), Some(c2)) => {
                if is_file_separator(c1) && is_file_separator(c2) {
                    if combined != Ordering::Equal {
                        return combined;
                    }
                    continue;
                }
                let compared = compare_chars_ignoring_case(c1, c2);
                if compared != Ordering::Equal {
                    return compared;
                }
                combined = compute_combined_compare(combined, c1, c2, case_sensitivity);
            }
            (None, None) => return combined,
            (None, Some(c2)) => {
                return if is_file_separator(c2) && combined != Ordering::Equal {
                    combined
                } else {
                    Ordering::Less
                }
            }
            (Some(c1), None) => {
                return if is_file_separator(c1) && combined != Ordering::Equal {
                    combined
                } else {
                    Ordering::Greater
                }
            }
        }
    }
}

/// Compares only the first segments of two relative paths.
///
/// Paths that share their first segment compare equal, which lets a binary search
/// over sibling entries find the child a deeper path descends into.
pub fn compare_first_segments(
    path1: &str,
    path2: &str,
    case_sensitivity: CaseSensitivity,
) -> Ordering {
    let mut combined = Ordering::Equal;
    let mut chars1 = path1.chars();
    let mut chars2 = path2.chars();
    loop {
        match (chars1.next(), chars2.next()) {
            (Some(c1), Some(c2)) => {
                match (is_file_separator(c1), is_file_separator(c2)) {
                    (true, true) => return combined,
                    (true, false) => return Ordering::Less,
                    (false, true) => return Ordering::Greater,
                    (false, false) => {}
                }
                let compared = compare_chars_ignoring_case(c1, c2);
                if compared != Ordering::Equal {
                    return compared;
                }
                combined = compute_combined_compare(combined, c1, c2, case_sensitivity);
            }
            (None, None) => return combined,
            (None, Some(c2)) => {
                return if is_file_separator(c2) {
                    combined
                } else {
                    Ordering::Less
                }
            }
            (Some(c1), None) => {
                return if is_file_separator(c1) {
                    combined
                } else {
                    Ordering::Greater
                }
            }
        }
    }
}

/// Length in bytes of the common prefix of two relative paths, cut back to the last
/// segment boundary both share. Returns 0 when the first segments differ.
pub fn length_of_common_prefix(
    path1: &str,
    path2: &str,
    case_sensitivity: CaseSensitivity,
) -> usize {
    let mut position = 0;
    let mut last_separator = 0;
    let mut chars1 = path1.chars();
    let mut chars2 = path2.chars();
    loop {
        match (chars1.next(), chars2.next()) {
            (Some(c1), Some(c2)) => {
                if !equal_chars(c1, c2, case_sensitivity) {
                    return last_separator;
                }
                if is_file_separator(c1) {
                    last_separator = position;
                }
                position += c1.len_utf8();
            }
            (None, None) => return position,
            (None, Some(c)) | (Some(c), None) => {
                return if is_file_separator(c) {
                    position
                } else {
                    last_separator
                }
            }
        }
    }
}

/// Whether `prefix` is `path` itself or one of its ancestors.
pub fn is_prefix(prefix: &str, path: &str, case_sensitivity: CaseSensitivity) -> bool {
    if prefix.is_empty() {
        return true;
    }
    let mut path_chars = path.chars();
    for p in prefix.chars() {
        match path_chars.next() {
            Some(c) if equal_chars(p, c, case_sensitivity) => {}
            _ => return false,
        }
    }
    match path_chars.next() {
        None => true,
        Some(c) => is_file_separator(c),
    }
}
