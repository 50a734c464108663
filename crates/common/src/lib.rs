//! Core model for projecting a Redmine tracker onto a read-only filesystem.
//!
//! - [`tracker`]: the remote tracker contract ([`tracker::Tracker`]), the
//!   project/issue data model and the entry-name encoding
//! - [`node`]: the root / project / issue node hierarchy consumed by a mount
//!   adapter
//!
//! Nothing in here knows about FUSE or HTTP; the `redminefs` crate wires the
//! nodes to `fuser` and the tracker contract to the Redmine REST API.

pub mod node;
pub mod tracker;

pub mod prelude {
    pub use crate::node::{DirEntry, EntryKind, Node, NodeAttr, NodeError};
    pub use crate::tracker::{Issue, Project, Tracker, TrackerError};
}
