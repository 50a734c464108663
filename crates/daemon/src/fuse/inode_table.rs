//! Bidirectional inode ↔ node mapping for FUSE filesystem
//!
//! FUSE uses 64-bit inode numbers to identify files and directories.
//! Projects and issues come from separate tracker id spaces, so their ids
//! cannot be handed to the kernel as-is; this table gives every node a
//! unique inode and keeps it stable for the life of the mount.
//!
//! Entries are never evicted (the adapter ignores `forget`), so the table
//! grows to at most one entry per project and issue seen while mounted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use common::node::{DirEntry, EntryKind, Node};

/// Identity of a node, independent of its inode number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Root,
    Project(u64),
    Issue(u64),
}

impl NodeKey {
    pub fn of(node: &Node) -> Self {
        match node {
            Node::Root(_) => NodeKey::Root,
            Node::Project(project) => NodeKey::Project(project.id()),
            Node::Issue(issue) => NodeKey::Issue(issue.id()),
        }
    }

    /// Key of a listed child. Only the root lists directories (projects)
    /// and only projects list files (issues).
    pub fn of_entry(entry: &DirEntry) -> Self {
        match entry.kind {
            EntryKind::Directory => NodeKey::Project(entry.identifier),
            EntryKind::File => NodeKey::Issue(entry.identifier),
        }
    }
}

/// Bidirectional mapping between inodes and node keys
#[derive(Debug)]
pub struct InodeTable {
    /// Key to inode mapping
    key_to_inode: HashMap<NodeKey, u64>,
    /// Inode to key mapping
    inode_to_key: HashMap<u64, NodeKey>,
    /// Next available inode number (starts at 2, as 1 is reserved for root)
    next_inode: AtomicU64,
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InodeTable {
    /// Root inode number (always 1 in FUSE)
    pub const ROOT_INODE: u64 = 1;

    /// Create a new inode table with root pre-registered
    pub fn new() -> Self {
        let mut table = Self {
            key_to_inode: HashMap::new(),
            inode_to_key: HashMap::new(),
            next_inode: AtomicU64::new(2), // Start at 2, 1 is root
        };

        table.register_root();
        table
    }

    /// Get or create an inode for a node key
    pub fn get_or_create(&mut self, key: NodeKey) -> u64 {
        if let Some(&inode) = self.key_to_inode.get(&key) {
            return inode;
        }

        let inode = self.next_inode.fetch_add(1, Ordering::SeqCst);
        self.key_to_inode.insert(key, inode);
        self.inode_to_key.insert(inode, key);
        inode
    }

    /// Get the inode for a key if one was assigned
    pub fn get_inode(&self, key: NodeKey) -> Option<u64> {
        self.key_to_inode.get(&key).copied()
    }

    /// Get the key for an inode if it exists
    pub fn get_key(&self, inode: u64) -> Option<NodeKey> {
        self.inode_to_key.get(&inode).copied()
    }

    /// Number of registered inodes, root included
    pub fn len(&self) -> usize {
        self.inode_to_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inode_to_key.is_empty()
    }

    /// Clear all mappings except root
    pub fn clear(&mut self) {
        self.key_to_inode.clear();
        self.inode_to_key.clear();
        self.next_inode.store(2, Ordering::SeqCst);

        self.register_root();
    }

    fn register_root(&mut self) {
        self.key_to_inode.insert(NodeKey::Root, Self::ROOT_INODE);
        self.inode_to_key.insert(Self::ROOT_INODE, NodeKey::Root);
    }
}
