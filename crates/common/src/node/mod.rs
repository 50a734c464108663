//! Filesystem node hierarchy for a tracker.
//!
//! ```text
//! /                       RootNode     one directory per project
//! /<project name>/        ProjectNode  one file per issue
//! /<project name>/<id>-<subject>  IssueNode  issue body, fetched on read
//! ```
//!
//! Nodes are cheap values built on demand and dropped after the call that
//! produced them. None of them owns its children; listing and lookup build
//! fresh nodes each time. The only shared state is the root's snapshot of
//! the last project listing, used to resolve project names.

mod issue;
mod project;
mod root;

pub use issue::IssueNode;
pub use project::ProjectNode;
pub use root::RootNode;

use crate::tracker::{EntryNameError, TrackerError};

/// Identifier reported by the root node
pub const ROOT_IDENTIFIER: u64 = 65535;

/// Permission bits for directories (r-xr-xr-x)
pub const DIR_PERMISSIONS: u16 = 0o555;

/// Permission bits for issue files (r--r--r--)
pub const FILE_PERMISSIONS: u16 = 0o444;

/// Size reported for issue files.
///
/// The real length is unknown until the body is fetched, so every issue
/// claims this size.
pub const PLACEHOLDER_SIZE: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Directory,
    File,
}

/// Attributes of a node as presented to the mount adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeAttr {
    /// Tracker id for projects and issues, [`ROOT_IDENTIFIER`] for the root
    pub identifier: u64,
    pub kind: EntryKind,
    pub perm: u16,
    pub size: u64,
}

impl NodeAttr {
    fn directory(identifier: u64) -> Self {
        Self {
            identifier,
            kind: EntryKind::Directory,
            perm: DIR_PERMISSIONS,
            size: 0,
        }
    }

    fn file(identifier: u64) -> Self {
        Self {
            identifier,
            kind: EntryKind::File,
            perm: FILE_PERMISSIONS,
            size: PLACEHOLDER_SIZE,
        }
    }
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub identifier: u64,
    pub name: String,
    pub kind: EntryKind,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error(transparent)]
    MalformedName(#[from] EntryNameError),
    #[error("no such entry: {0}")]
    NotFound(String),
    #[error("not a directory")]
    NotADirectory,
    #[error("is a directory")]
    IsADirectory,
}

/// A node of the mounted tree.
///
/// Directories (`Root`, `Project`) answer [`list_children`](Node::list_children)
/// and [`lookup_child`](Node::lookup_child); files (`Issue`) answer
/// [`read_all`](Node::read_all). Asking a node for the other capability
/// yields `NotADirectory` / `IsADirectory`.
#[derive(Debug, Clone)]
pub enum Node {
    Root(RootNode),
    Project(ProjectNode),
    Issue(IssueNode),
}

impl Node {
    pub fn attributes(&self) -> NodeAttr {
        match self {
            Node::Root(root) => root.attributes(),
            Node::Project(project) => project.attributes(),
            Node::Issue(issue) => issue.attributes(),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.attributes().kind == EntryKind::Directory
    }

    pub async fn list_children(&self) -> Result<Vec<DirEntry>, NodeError> {
        match self {
            Node::Root(root) => root.list_children().await,
            Node::Project(project) => project.list_children().await,
            Node::Issue(_) => Err(NodeError::NotADirectory),
        }
    }

    pub async fn lookup_child(&self, name: &str) -> Result<Node, NodeError> {
        match self {
            Node::Root(root) => root.lookup_child(name).await.map(Node::Project),
            Node::Project(project) => project.lookup_child(name).map(Node::Issue),
            Node::Issue(_) => Err(NodeError::NotADirectory),
        }
    }

    pub async fn read_all(&self) -> Result<Vec<u8>, NodeError> {
        match self {
            Node::Issue(issue) => issue.read_all().await,
            Node::Root(_) | Node::Project(_) => Err(NodeError::IsADirectory),
        }
    }
}
