//! FUSE filesystem integration for a Redmine tracker
//!
//! Mounts the tracker as a read-only tree: one directory per project, one
//! file per issue named `<id>-<subject>`, whose content is the issue body.
//!
//! # Architecture
//!
//! - `LiveMount`: Spawns the FUSE session and unmounts on drop
//! - `RedmineFs`: FUSE filesystem implementation using fuser
//! - `InodeTable`: Bidirectional inode ↔ node mapping
//! - `HandleTable`: Directory listings and file bodies held per open handle
//!
//! Nothing is cached beyond an open handle: every `opendir` lists again and
//! every `open` fetches the body again.

mod error;
mod handles;
mod inode_table;
mod mount;
mod redmine_fs;

pub use error::{FsError, FsResult};
pub use handles::{DirListing, FsHandle, HandleTable};
pub use inode_table::{InodeTable, NodeKey};
pub use mount::{LiveMount, MountConfig, MountError, FS_NAME, FS_SUBTYPE};
pub use redmine_fs::RedmineFs;
