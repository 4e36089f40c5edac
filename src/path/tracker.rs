//! Tracks the relative path while walking a snapshot hierarchy.

/// Stack of segment names entered during a depth-first walk.
///
/// The first entered name belongs to the root of the walk and is not part of the
/// relative path of its descendants.
#[derive(Debug, Default, Clone)]
pub struct RelativePathTracker {
    segments: Vec<String>,
}

impl RelativePathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, name: &str) {
        self.segments.push(name.to_string());
    }

    pub fn leave(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// True while only the root of the walk has been entered
    pub fn is_root(&self) -> bool {
        self.segments.len() == 1
    }

    /// Segments below the root of the walk
    pub fn segments(&self) -> &[String] {
        self.segments.get(1..).unwrap_or(&[])
    }

    /// Relative path joined with `/`; empty for the root itself
    pub fn to_relative_path(&self) -> String {
        self.segments().join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_segments_below_root() {
        let mut tracker = RelativePathTracker::new();
        assert!(tracker.segments().is_empty());
        tracker.enter("project");
        assert!(tracker.is_root());
        assert_eq!(tracker.to_relative_path(), "");

        tracker.enter("src");
        tracker.enter("lib.rs");
        assert!(!tracker.is_root());
        assert_eq!(tracker.to_relative_path(), "src/lib.rs");

        assert_eq!(tracker.leave().as_deref(), Some("lib.rs"));
        assert_eq!(tracker.segments(), &["src".to_string()]);
    }
}
