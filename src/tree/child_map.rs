//! Sorted child maps of the snapshot trie
//!
//! A `ChildMap` associates relative paths with child nodes. Entry paths may span
//! several segments (`a/b/c`) when no other entry shares their prefix; entries never
//! share a first segment, so at most one entry can contain a given target path.
//! Maps are immutable: every update returns a new map and shares the unchanged
//! entries' values with the old one.

use crate::path::{compare_first_segments, compare_paths, CaseSensitivity, VfsRelativePath};
use std::cmp::Ordering;
use std::sync::Arc;

/// A child of a node, keyed by its path relative to the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<T> {
    path: Arc<str>,
    value: T,
}

impl<T> Entry<T> {
    pub fn new(path: impl Into<Arc<str>>, value: T) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

/// How a target path relates to the entries of a map
#[derive(Debug)]
pub enum NodeRelation<'a, 'p, T> {
    /// The target lies below `child`; `path_in_child` is relative to it
    DescendantOfChild {
        path_in_child: VfsRelativePath<'p>,
        child: &'a T,
    },
    /// `child` lies below the target; `child_path` is relative to the map's owner
    AncestorOfChild { child_path: &'a str, child: &'a T },
    ExactMatch(&'a T),
    /// No entry shares the target's path, including entries that only share a
    /// partial prefix with it
    Unrelated,
}

/// Decides what a store turns existing children into
pub trait StoreHandler<T> {
    fn handle_as_descendant_of_child(&mut self, path_in_child: VfsRelativePath<'_>, child: &T) -> T;
    /// `child_path` is relative to the map's owner and lies below the target
    fn handle_as_ancestor_of_child(&mut self, child_path: &str, child: &T) -> T;
    fn merge_with_existing(&mut self, child: &T) -> T;
    /// Node for the target when no entry relates to it
    fn create_child(&mut self) -> T;
    /// Intermediate node for the common prefix of an existing entry and the target
    fn create_node_from_children(&mut self, children: ChildMap<T>) -> T;
}

/// Observes the children an invalidation removes
pub trait InvalidationHandler<T> {
    /// Narrowed child, or `None` to drop the child entirely
    fn handle_as_descendant_of_child(
        &mut self,
        path_in_child: VfsRelativePath<'_>,
        child: &T,
    ) -> Option<T>;
    fn handle_as_ancestor_of_child(&mut self, child_path: &str, child: &T);
    fn handle_exact_match_with_child(&mut self, child: &T);
    fn handle_unrelated_to_any_child(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Exact,
    Descendant,
    Ancestor,
    Sibling(usize),
    Unrelated,
}

fn relation_to(child_path: &str, target: VfsRelativePath<'_>, case_sensitivity: CaseSensitivity) -> Relation {
    let common = target.length_of_common_prefix(child_path, case_sensitivity);
    if common == 0 {
        return Relation::Unrelated;
    }
    let child_len = child_path.len();
    let target_len = target.len();
    match (common == child_len, common == target_len) {
        (true, true) => Relation::Exact,
        (true, false) => Relation::Descendant,
        (false, true) => Relation::Ancestor,
        (false, false) => Relation::Sibling(common),
    }
}

/// Immutable sorted map from relative paths to children.
///
/// The representation follows the number of entries; maps built by this module are
/// always in the smallest one.
#[derive(Debug, Clone)]
pub enum ChildMap<T> {
    Empty,
    Singleton(Arc<Entry<T>>),
    List(Arc<[Entry<T>]>),
}

impl<T> Default for ChildMap<T> {
    fn default() -> Self {
        ChildMap::Empty
    }
}

impl<T: PartialEq> PartialEq for ChildMap<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries() == other.entries()
    }
}

impl<T: Eq> Eq for ChildMap<T> {}

impl<T: Clone> ChildMap<T> {
    /// Map over entries already sorted by `compare_paths` with distinct first segments
    pub fn from_sorted(entries: Vec<Entry<T>>, case_sensitivity: CaseSensitivity) -> Self {
        debug_assert!(
            entries.windows(2).all(|pair| {
                compare_paths(pair[0].path(), pair[1].path(), case_sensitivity) == Ordering::Less
            }),
            "child map entries must be strictly sorted"
        );
        match entries.len() {
            0 => ChildMap::Empty,
            1 => {
                let mut entries = entries;
                match entries.pop() {
                    Some(entry) => ChildMap::Singleton(Arc::new(entry)),
                    None => ChildMap::Empty,
                }
            }
            _ => ChildMap::List(entries.into()),
        }
    }

    /// Map over entries in any order
    pub fn from_entries(mut entries: Vec<Entry<T>>, case_sensitivity: CaseSensitivity) -> Self {
        entries.sort_by(|left, right| compare_paths(left.path(), right.path(), case_sensitivity));
        Self::from_sorted(entries, case_sensitivity)
    }

    pub fn singleton(path: impl Into<Arc<str>>, value: T) -> Self {
        ChildMap::Singleton(Arc::new(Entry::new(path, value)))
    }

    fn with_entries(
        &self,
        case_sensitivity: CaseSensitivity,
        update: impl FnOnce(&mut Vec<Entry<T>>),
    ) -> Self {
        let mut entries = self.entries().to_vec();
        update(&mut entries);
        Self::from_sorted(entries, case_sensitivity)
    }

    /// Index of the entry sharing the target's first segment, or the insertion point
    fn find_child_index(
        &self,
        target: VfsRelativePath<'_>,
        case_sensitivity: CaseSensitivity,
    ) -> Result<usize, usize> {
        match self {
            ChildMap::Empty => Err(0),
            ChildMap::Singleton(entry) => {
                match compare_first_segments(entry.path(), target.as_str(), case_sensitivity) {
                    Ordering::Equal => Ok(0),
                    Ordering::Less => Err(1),
                    Ordering::Greater => Err(0),
                }
            }
            ChildMap::List(entries) => entries.binary_search_by(|entry| {
                compare_first_segments(entry.path(), target.as_str(), case_sensitivity)
            }),
        }
    }

    /// Read-only descent towards `target`
    pub fn with_node<'a, 'p>(
        &'a self,
        target: VfsRelativePath<'p>,
        case_sensitivity: CaseSensitivity,
    ) -> NodeRelation<'a, 'p, T> {
        let Ok(index) = self.find_child_index(target, case_sensitivity) else {
            return NodeRelation::Unrelated;
        };
        let entry = &self.entries()[index];
        match relation_to(entry.path(), target, case_sensitivity) {
            Relation::Exact => NodeRelation::ExactMatch(entry.value()),
            Relation::Descendant => NodeRelation::DescendantOfChild {
                path_in_child: target.path_from_child(entry.path()),
                child: entry.value(),
            },
            Relation::Ancestor => NodeRelation::AncestorOfChild {
                child_path: entry.path(),
                child: entry.value(),
            },
            Relation::Sibling(_) | Relation::Unrelated => NodeRelation::Unrelated,
        }
    }

    /// New map with the target stored
    pub fn store<H: StoreHandler<T>>(
        &self,
        target: VfsRelativePath<'_>,
        case_sensitivity: CaseSensitivity,
        handler: &mut H,
    ) -> Self {
        debug_assert!(!target.is_empty(), "cannot store the owner of a child map in it");
        let index = match self.find_child_index(target, case_sensitivity) {
            Ok(index) => index,
            Err(insertion) => {
                let entry = Entry::new(target.as_str(), handler.create_child());
                return self.with_entries(case_sensitivity, |entries| entries.insert(insertion, entry));
            }
        };
        let existing = &self.entries()[index];
        let replacement = match relation_to(existing.path(), target, case_sensitivity) {
            Relation::Descendant => {
                let path_in_child = target.path_from_child(existing.path());
                Entry {
                    path: existing.path.clone(),
                    value: handler.handle_as_descendant_of_child(path_in_child, existing.value()),
                }
            }
            Relation::Ancestor => Entry::new(
                target.as_str(),
                handler.handle_as_ancestor_of_child(existing.path(), existing.value()),
            ),
            Relation::Exact => Entry {
                path: existing.path.clone(),
                value: handler.merge_with_existing(existing.value()),
            },
            Relation::Sibling(common) => {
                let existing_suffix = &existing.path()[common + 1..];
                let target_suffix = target.suffix_starting_from(common + 1);
                let existing_entry = Entry::new(existing_suffix, existing.value().clone());
                let new_entry = Entry::new(target_suffix.as_str(), handler.create_child());
                let children = match compare_paths(existing_suffix, target_suffix.as_str(), case_sensitivity) {
                    Ordering::Less => vec![existing_entry, new_entry],
                    _ => vec![new_entry, existing_entry],
                };
                Entry::new(
                    &existing.path()[..common],
                    handler.create_node_from_children(ChildMap::from_sorted(children, case_sensitivity)),
                )
            }
            Relation::Unrelated => unreachable!(
                "'{}' shares its first segment with '{}' but no common prefix",
                existing.path(),
                target
            ),
        };
        self.with_entries(case_sensitivity, |entries| entries[index] = replacement)
    }

    /// New map with the target invalidated, or `None` when no entry is left
    pub fn invalidate<H: InvalidationHandler<T>>(
        &self,
        target: VfsRelativePath<'_>,
        case_sensitivity: CaseSensitivity,
        handler: &mut H,
    ) -> Option<Self> {
        let index = match self.find_child_index(target, case_sensitivity) {
            Ok(index) => index,
            Err(_) => {
                handler.handle_unrelated_to_any_child();
                return Some(self.clone());
            }
        };
        let existing = &self.entries()[index];
        let narrowed = match relation_to(existing.path(), target, case_sensitivity) {
            Relation::Descendant => {
                let path_in_child = target.path_from_child(existing.path());
                handler
                    .handle_as_descendant_of_child(path_in_child, existing.value())
                    .map(|value| Entry {
                        path: existing.path.clone(),
                        value,
                    })
            }
            Relation::Ancestor => {
                handler.handle_as_ancestor_of_child(existing.path(), existing.value());
                None
            }
            Relation::Exact => {
                handler.handle_exact_match_with_child(existing.value());
                None
            }
            Relation::Sibling(_) | Relation::Unrelated => {
                handler.handle_unrelated_to_any_child();
                return Some(self.clone());
            }
        };
        let updated = match narrowed {
            Some(entry) => self.with_entries(case_sensitivity, |entries| entries[index] = entry),
            None => self.with_entries(case_sensitivity, |entries| {
                entries.remove(index);
            }),
        };
        if updated.is_empty() {
            None
        } else {
            Some(updated)
        }
    }
}

impl<T> ChildMap<T> {
    pub fn entries(&self) -> &[Entry<T>] {
        match self {
            ChildMap::Empty => &[],
            ChildMap::Singleton(entry) => std::slice::from_ref(entry.as_ref()),
            ChildMap::List(entries) => &entries[..],
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries().iter().map(Entry::value)
    }

    /// Whether both maps share the same storage
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ChildMap::Empty, ChildMap::Empty) => true,
            (ChildMap::Singleton(left), ChildMap::Singleton(right)) => Arc::ptr_eq(left, right),
            (ChildMap::List(left), ChildMap::List(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use CaseSensitivity::{CaseInsensitive, CaseSensitive};

    /// Values record how they were produced
    struct Put(&'static str);

    impl StoreHandler<String> for Put {
        fn handle_as_descendant_of_child(&mut self, path_in_child: VfsRelativePath<'_>, child: &String) -> String {
            format!("{}>{}={}", child, path_in_child, self.0)
        }

        fn handle_as_ancestor_of_child(&mut self, child_path: &str, child: &String) -> String {
            format!("{}<{}={}", self.0, child_path, child)
        }

        fn merge_with_existing(&mut self, child: &String) -> String {
            format!("{}+{}", child, self.0)
        }

        fn create_child(&mut self) -> String {
            self.0.to_string()
        }

        fn create_node_from_children(&mut self, children: ChildMap<String>) -> String {
            let parts: Vec<String> = children
                .entries()
                .iter()
                .map(|entry| format!("{}:{}", entry.path(), entry.value()))
                .collect();
            format!("[{}]", parts.join(","))
        }
    }

    #[derive(Default)]
    struct Removed(Vec<String>);

    impl InvalidationHandler<String> for Removed {
        fn handle_as_descendant_of_child(
            &mut self,
            path_in_child: VfsRelativePath<'_>,
            child: &String,
        ) -> Option<String> {
            self.0.push(format!("{}>{}", child, path_in_child));
            None
        }

        fn handle_as_ancestor_of_child(&mut self, child_path: &str, child: &String) {
            self.0.push(format!("<{}={}", child_path, child));
        }

        fn handle_exact_match_with_child(&mut self, child: &String) {
            self.0.push(child.clone());
        }

        fn handle_unrelated_to_any_child(&mut self) {
            self.0.push("unrelated".to_string());
        }
    }

    fn store(map: &ChildMap<String>, path: &str, value: &'static str) -> ChildMap<String> {
        map.store(VfsRelativePath::of(path), CaseSensitive, &mut Put(value))
    }

    fn paths(map: &ChildMap<String>) -> Vec<&str> {
        map.entries().iter().map(Entry::path).collect()
    }

    #[test]
    fn test_representation_follows_size() {
        let empty: ChildMap<String> = ChildMap::Empty;
        let one = store(&empty, "/b", "1");
        assert!(matches!(one, ChildMap::Singleton(_)));
        let two = store(&one, "/a", "2");
        assert!(matches!(two, ChildMap::List(_)));
        assert_eq!(paths(&two), vec!["a", "b"]);

        let mut removed = Removed::default();
        let back = two
            .invalidate(VfsRelativePath::of("/a"), CaseSensitive, &mut removed)
            .unwrap();
        assert!(matches!(back, ChildMap::Singleton(_)));
        assert!(back
            .invalidate(VfsRelativePath::of("/b"), CaseSensitive, &mut removed)
            .is_none());
        assert_eq!(removed.0, vec!["2", "1"]);
    }

    #[test]
    fn test_store_dispatch() {
        let map = store(&ChildMap::Empty, "/a/b", "x");
        assert_eq!(paths(&map), vec!["a/b"]);

        let descendant = store(&map, "/a/b/c", "y");
        assert_eq!(descendant.entries()[0].value(), "x>c=y");

        let ancestor = store(&map, "/a", "y");
        assert_eq!(paths(&ancestor), vec!["a"]);
        assert_eq!(ancestor.entries()[0].value(), "y<a/b=x");

        let exact = store(&map, "/a/b", "y");
        assert_eq!(exact.entries()[0].value(), "x+y");
        assert_eq!(paths(&exact), vec!["a/b"]);
    }

    #[test]
    fn test_store_splits_partial_prefix() {
        let map = store(&ChildMap::Empty, "/a/b/c", "x");
        let split = store(&map, "/a/b/d/e", "y");
        assert_eq!(paths(&split), vec!["a/b"]);
        assert_eq!(split.entries()[0].value(), "[c:x,d/e:y]");

        let before = store(&map, "/a/a", "z");
        assert_eq!(before.entries()[0].value(), "[a:z,b/c:x]");
    }

    #[test]
    fn test_with_node_outcomes() {
        let map = store(&store(&ChildMap::Empty, "/a/b", "x"), "/c", "y");
        match map.with_node(VfsRelativePath::of("/a/b/c/d"), CaseSensitive) {
            NodeRelation::DescendantOfChild { path_in_child, child } => {
                assert_eq!(path_in_child.as_str(), "c/d");
                assert_eq!(child, "x");
            }
            other => panic!("unexpected {:?}", other),
        }
        match map.with_node(VfsRelativePath::of("/a"), CaseSensitive) {
            NodeRelation::AncestorOfChild { child_path, child } => {
                assert_eq!(child_path, "a/b");
                assert_eq!(child, "x");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            map.with_node(VfsRelativePath::of("/c"), CaseSensitive),
            NodeRelation::ExactMatch(value) if value == "y"
        ));
        assert!(matches!(
            map.with_node(VfsRelativePath::of("/a/x"), CaseSensitive),
            NodeRelation::Unrelated
        ));
        assert!(matches!(
            map.with_node(VfsRelativePath::of("/b"), CaseSensitive),
            NodeRelation::Unrelated
        ));
        assert!(matches!(
            map.with_node(VfsRelativePath::of("/C"), CaseInsensitive),
            NodeRelation::ExactMatch(_)
        ));
        assert!(matches!(
            map.with_node(VfsRelativePath::of("/C"), CaseSensitive),
            NodeRelation::Unrelated
        ));
    }

    #[test]
    fn test_invalidate_dispatch() {
        let map = store(&store(&ChildMap::Empty, "/a/b", "x"), "/c", "y");

        let mut handler = Removed::default();
        let unrelated = map
            .invalidate(VfsRelativePath::of("/a/z"), CaseSensitive, &mut handler)
            .unwrap();
        assert!(unrelated.ptr_eq(&map));

        let without_a = map
            .invalidate(VfsRelativePath::of("/a"), CaseSensitive, &mut handler)
            .unwrap();
        assert_eq!(paths(&without_a), vec!["c"]);

        let below = map
            .invalidate(VfsRelativePath::of("/a/b/q"), CaseSensitive, &mut handler)
            .unwrap();
        assert_eq!(paths(&below), vec!["c"]);
        assert_eq!(handler.0, vec!["unrelated", "<a/b=x", "x>q"]);
    }

    #[test]
    fn test_unchanged_values_are_shared() {
        let map = store(&store(&ChildMap::Empty, "/a", "x"), "/b", "y");
        let updated = store(&map, "/c", "z");
        assert!(std::ptr::eq(
            map.entries()[0].path().as_ptr(),
            updated.entries()[0].path().as_ptr()
        ));
    }

    #[test]
    fn test_case_variant_siblings_stay_sorted() {
        let map = store(&store(&ChildMap::Empty, "/A/x", "1"), "/b", "2");
        let map = store(&map, "/a", "3");
        assert_eq!(paths(&map), vec!["A/x", "a", "b"]);
        assert!(matches!(
            map.with_node(VfsRelativePath::of("/a"), CaseSensitive),
            NodeRelation::ExactMatch(value) if value == "3"
        ));
        assert!(matches!(
            map.with_node(VfsRelativePath::of("/A/x"), CaseSensitive),
            NodeRelation::ExactMatch(value) if value == "1"
        ));
    }

    fn case_variant_operations() -> impl Strategy<Value = Vec<(bool, Vec<String>)>> {
        let segments = prop::collection::vec("[abAB]{1,2}", 1..4);
        let random = prop::collection::vec((prop::bool::ANY, segments), 1..40);
        let siblings = prop::sample::select(vec![
            vec!["A/b", "a"],
            vec!["a/b", "A"],
            vec!["A", "b", "a"],
            vec!["Ab/a", "aB", "AB/b"],
        ]);
        (siblings, random).prop_map(|(siblings, mut operations)| {
            let mut stores: Vec<(bool, Vec<String>)> = siblings
                .into_iter()
                .map(|path| (true, path.split('/').map(str::to_string).collect()))
                .collect();
            stores.append(&mut operations);
            stores
        })
    }

    proptest! {
        #[test]
        fn test_entries_stay_sorted_and_disjoint(
            operations in case_variant_operations(),
            sensitive in prop::bool::ANY,
        ) {
            let cs = if sensitive { CaseSensitive } else { CaseInsensitive };
            let mut map: ChildMap<String> = ChildMap::Empty;
            for (is_store, segments) in operations {
                let path = format!("/{}", segments.join("/"));
                if is_store {
                    map = map.store(VfsRelativePath::of(&path), cs, &mut Put("v"));
                } else {
                    map = map
                        .invalidate(VfsRelativePath::of(&path), cs, &mut Removed::default())
                        .unwrap_or_default();
                }
                for pair in map.entries().windows(2) {
                    prop_assert_eq!(
                        compare_paths(pair[0].path(), pair[1].path(), cs),
                        Ordering::Less
                    );
                    prop_assert_eq!(
                        compare_first_segments(pair[0].path(), pair[1].path(), cs),
                        Ordering::Less
                    );
                }
            }
        }
    }
}
