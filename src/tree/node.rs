//! Nodes of the snapshot hierarchy
//!
//! A node records what is known about one location: a complete snapshot, a
//! directory of which only some children are known, or nothing about the location
//! itself but something about its descendants. Operations return new nodes and
//! never modify existing ones.

use crate::path::{CaseSensitivity, VfsRelativePath};
use crate::snapshot::{AccessType, FileSystemLocationSnapshot, MetadataSnapshot};
use crate::tree::child_map::{ChildMap, Entry, InvalidationHandler, NodeRelation, StoreHandler};
use crate::tree::diff::NodeDiffListener;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSystemNode {
    /// Complete knowledge of the location and everything below it
    Snapshot(FileSystemLocationSnapshot),
    /// The location is a directory; `children` are the known parts of its content
    PartialDirectory {
        access_type: AccessType,
        children: ChildMap<FileSystemNode>,
    },
    /// Nothing is known about the location except for its (non-empty) children
    Unknown { children: ChildMap<FileSystemNode> },
}

impl FileSystemNode {
    pub fn from_metadata(snapshot: MetadataSnapshot) -> Self {
        match snapshot {
            MetadataSnapshot::Directory(access_type) => FileSystemNode::PartialDirectory {
                access_type,
                children: ChildMap::Empty,
            },
            MetadataSnapshot::Location(location) => FileSystemNode::Snapshot(location),
        }
    }

    pub fn unknown(children: ChildMap<FileSystemNode>) -> Self {
        assert!(!children.is_empty(), "unknown nodes must have children");
        FileSystemNode::Unknown { children }
    }

    /// What is known about this location itself
    pub fn snapshot(&self) -> Option<MetadataSnapshot> {
        match self {
            FileSystemNode::Snapshot(location) => Some(MetadataSnapshot::Location(location.clone())),
            FileSystemNode::PartialDirectory { access_type, .. } => {
                Some(MetadataSnapshot::Directory(*access_type))
            }
            FileSystemNode::Unknown { .. } => None,
        }
    }

    /// Complete snapshot of this location, if known
    pub fn location_snapshot(&self) -> Option<&FileSystemLocationSnapshot> {
        match self {
            FileSystemNode::Snapshot(location) => Some(location),
            _ => None,
        }
    }

    /// Known children of incomplete nodes
    pub fn children(&self) -> Option<&ChildMap<FileSystemNode>> {
        match self {
            FileSystemNode::Snapshot(_) => None,
            FileSystemNode::PartialDirectory { children, .. }
            | FileSystemNode::Unknown { children } => Some(children),
        }
    }

    /// Whether the node holds at least one complete snapshot
    pub fn has_descendants(&self) -> bool {
        match self {
            FileSystemNode::Snapshot(_) => true,
            FileSystemNode::PartialDirectory { children, .. }
            | FileSystemNode::Unknown { children } => {
                children.values().any(FileSystemNode::has_descendants)
            }
        }
    }

    /// Visits the topmost complete snapshots in this node, in path order
    pub fn visit_root_snapshots(&self, visitor: &mut dyn FnMut(&FileSystemLocationSnapshot)) {
        match self {
            FileSystemNode::Snapshot(location) => visitor(location),
            FileSystemNode::PartialDirectory { children, .. }
            | FileSystemNode::Unknown { children } => {
                for child in children.values() {
                    child.visit_root_snapshots(visitor);
                }
            }
        }
    }

    pub fn root_snapshots(&self) -> Vec<FileSystemLocationSnapshot> {
        let mut snapshots = Vec::new();
        self.visit_root_snapshots(&mut |snapshot| snapshots.push(snapshot.clone()));
        snapshots
    }

    /// Whether both nodes are backed by the same shared data
    pub fn ptr_eq(&self, other: &FileSystemNode) -> bool {
        match (self, other) {
            (FileSystemNode::Snapshot(left), FileSystemNode::Snapshot(right)) => left.ptr_eq(right),
            (
                FileSystemNode::PartialDirectory {
                    access_type: left_access,
                    children: left,
                },
                FileSystemNode::PartialDirectory {
                    access_type: right_access,
                    children: right,
                },
            ) => left_access == right_access && left.ptr_eq(right),
            (FileSystemNode::Unknown { children: left }, FileSystemNode::Unknown { children: right }) => {
                left.ptr_eq(right)
            }
            _ => false,
        }
    }

    /// Metadata known for `target`, relative to this node
    pub fn get_snapshot(
        &self,
        target: VfsRelativePath<'_>,
        case_sensitivity: CaseSensitivity,
    ) -> Option<MetadataSnapshot> {
        if target.is_empty() {
            return self.snapshot();
        }
        match self {
            FileSystemNode::Snapshot(location) => Some(MetadataSnapshot::Location(
                location.descendant_snapshot(target, case_sensitivity),
            )),
            FileSystemNode::PartialDirectory { children, .. }
            | FileSystemNode::Unknown { children } => {
                match children.with_node(target, case_sensitivity) {
                    NodeRelation::ExactMatch(child) => child.snapshot(),
                    NodeRelation::DescendantOfChild {
                        path_in_child,
                        child,
                    } => child.get_snapshot(path_in_child, case_sensitivity),
                    NodeRelation::AncestorOfChild { .. } | NodeRelation::Unrelated => None,
                }
            }
        }
    }

    /// Node describing `target`, relative to this node
    pub fn get_node(
        &self,
        target: VfsRelativePath<'_>,
        case_sensitivity: CaseSensitivity,
    ) -> Option<FileSystemNode> {
        if target.is_empty() {
            return Some(self.clone());
        }
        match self {
            FileSystemNode::Snapshot(location) => Some(FileSystemNode::Snapshot(
                location.descendant_snapshot(target, case_sensitivity),
            )),
            FileSystemNode::PartialDirectory { children, .. }
            | FileSystemNode::Unknown { children } => {
                match children.with_node(target, case_sensitivity) {
                    NodeRelation::ExactMatch(child) => Some(child.clone()),
                    NodeRelation::DescendantOfChild {
                        path_in_child,
                        child,
                    } => child.get_node(path_in_child, case_sensitivity),
                    NodeRelation::AncestorOfChild { child_path, child } => {
                        let path_below_target = &child_path[target.len() + 1..];
                        Some(FileSystemNode::unknown(ChildMap::singleton(
                            path_below_target,
                            child.clone(),
                        )))
                    }
                    NodeRelation::Unrelated => None,
                }
            }
        }
    }

    /// New node with `snapshot` stored at `target`.
    ///
    /// Complete snapshots already present at `target` or above it win over the new
    /// information.
    pub fn store(
        &self,
        target: VfsRelativePath<'_>,
        case_sensitivity: CaseSensitivity,
        snapshot: &MetadataSnapshot,
        diff_listener: &mut dyn NodeDiffListener,
    ) -> FileSystemNode {
        let mut handler = NodeStoreHandler {
            target_len: target.len(),
            case_sensitivity,
            snapshot,
            diff_listener,
        };
        if target.is_empty() {
            return handler.merge_with_existing(self);
        }
        match self {
            FileSystemNode::Snapshot(_) => self.clone(),
            FileSystemNode::PartialDirectory {
                access_type,
                children,
            } => FileSystemNode::PartialDirectory {
                access_type: *access_type,
                children: children.store(target, case_sensitivity, &mut handler),
            },
            FileSystemNode::Unknown { children } => FileSystemNode::Unknown {
                children: children.store(target, case_sensitivity, &mut handler),
            },
        }
    }

    /// Node for `snapshot` stored at `target` below a location nothing is known about
    pub fn new_at(
        target: VfsRelativePath<'_>,
        snapshot: &MetadataSnapshot,
        diff_listener: &mut dyn NodeDiffListener,
    ) -> FileSystemNode {
        let node = FileSystemNode::from_metadata(snapshot.clone());
        diff_listener.node_added(&node);
        if target.is_empty() {
            node
        } else {
            FileSystemNode::unknown(ChildMap::singleton(target.as_str(), node))
        }
    }

    /// Node without any information about `target`, or `None` if nothing is left.
    pub fn invalidate(
        &self,
        target: VfsRelativePath<'_>,
        case_sensitivity: CaseSensitivity,
        diff_listener: &mut dyn NodeDiffListener,
    ) -> Option<FileSystemNode> {
        if target.is_empty() {
            diff_listener.node_removed(self);
            return None;
        }
        let mut handler = NodeInvalidationHandler {
            case_sensitivity,
            diff_listener,
        };
        match self {
            FileSystemNode::Snapshot(FileSystemLocationSnapshot::Directory(directory)) => {
                handler.diff_listener.node_removed(self);
                let entries = directory
                    .children()
                    .iter()
                    .map(|child| {
                        let node = FileSystemNode::Snapshot(child.clone());
                        handler.diff_listener.node_added(&node);
                        Entry::new(child.name(), node)
                    })
                    .collect();
                let children = ChildMap::from_entries(entries, case_sensitivity);
                Some(FileSystemNode::PartialDirectory {
                    access_type: directory.access_type(),
                    children: children
                        .invalidate(target, case_sensitivity, &mut handler)
                        .unwrap_or_default(),
                })
            }
            FileSystemNode::Snapshot(_) => {
                handler.diff_listener.node_removed(self);
                None
            }
            FileSystemNode::PartialDirectory {
                access_type,
                children,
            } => Some(FileSystemNode::PartialDirectory {
                access_type: *access_type,
                children: children
                    .invalidate(target, case_sensitivity, &mut handler)
                    .unwrap_or_default(),
            }),
            FileSystemNode::Unknown { children } => children
                .invalidate(target, case_sensitivity, &mut handler)
                .map(|children| FileSystemNode::Unknown { children }),
        }
    }
}

impl From<FileSystemLocationSnapshot> for FileSystemNode {
    fn from(snapshot: FileSystemLocationSnapshot) -> Self {
        FileSystemNode::Snapshot(snapshot)
    }
}

struct NodeStoreHandler<'s, 'l> {
    target_len: usize,
    case_sensitivity: CaseSensitivity,
    snapshot: &'s MetadataSnapshot,
    diff_listener: &'l mut dyn NodeDiffListener,
}

impl NodeStoreHandler<'_, '_> {
    fn replace(&mut self, existing: &FileSystemNode) -> FileSystemNode {
        let node = FileSystemNode::from_metadata(self.snapshot.clone());
        self.diff_listener.node_removed(existing);
        self.diff_listener.node_added(&node);
        node
    }
}

impl StoreHandler<FileSystemNode> for NodeStoreHandler<'_, '_> {
    fn handle_as_descendant_of_child(
        &mut self,
        path_in_child: VfsRelativePath<'_>,
        child: &FileSystemNode,
    ) -> FileSystemNode {
        child.store(path_in_child, self.case_sensitivity, self.snapshot, &mut *self.diff_listener)
    }

    fn handle_as_ancestor_of_child(&mut self, child_path: &str, child: &FileSystemNode) -> FileSystemNode {
        match self.snapshot {
            MetadataSnapshot::Location(_) => self.replace(child),
            MetadataSnapshot::Directory(access_type) => FileSystemNode::PartialDirectory {
                access_type: *access_type,
                children: ChildMap::singleton(&child_path[self.target_len + 1..], child.clone()),
            },
        }
    }

    fn merge_with_existing(&mut self, child: &FileSystemNode) -> FileSystemNode {
        match (child, self.snapshot) {
            (FileSystemNode::Snapshot(_), _) => child.clone(),
            (_, MetadataSnapshot::Location(_)) => self.replace(child),
            (FileSystemNode::Unknown { children }, MetadataSnapshot::Directory(access_type)) => {
                FileSystemNode::PartialDirectory {
                    access_type: *access_type,
                    children: children.clone(),
                }
            }
            (FileSystemNode::PartialDirectory { .. }, MetadataSnapshot::Directory(_)) => child.clone(),
        }
    }

    fn create_child(&mut self) -> FileSystemNode {
        let node = FileSystemNode::from_metadata(self.snapshot.clone());
        self.diff_listener.node_added(&node);
        node
    }

    fn create_node_from_children(&mut self, children: ChildMap<FileSystemNode>) -> FileSystemNode {
        FileSystemNode::unknown(children)
    }
}

struct NodeInvalidationHandler<'l> {
    case_sensitivity: CaseSensitivity,
    diff_listener: &'l mut dyn NodeDiffListener,
}

impl InvalidationHandler<FileSystemNode> for NodeInvalidationHandler<'_> {
    fn handle_as_descendant_of_child(
        &mut self,
        path_in_child: VfsRelativePath<'_>,
        child: &FileSystemNode,
    ) -> Option<FileSystemNode> {
        child.invalidate(path_in_child, self.case_sensitivity, &mut *self.diff_listener)
    }

    fn handle_as_ancestor_of_child(&mut self, _child_path: &str, child: &FileSystemNode) {
        self.diff_listener.node_removed(child);
    }

    fn handle_exact_match_with_child(&mut self, child: &FileSystemNode) {
        self.diff_listener.node_removed(child);
    }
}
