//! Errno mapping for filesystem operations.
//!
//! Node failures carry the operation they happened in, because the same
//! tracker error means different things to the caller: a failed lookup is
//! "no such entry", a failed listing or read is an I/O error.

use common::node::NodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    /// The kernel asked about an inode this mount never handed out.
    #[error("Invalid inode: {0}")]
    InvalidInode(u64),

    /// Invalid file or directory handle.
    #[error("Invalid file handle: {0}")]
    InvalidHandle(u64),

    /// Name is not valid UTF-8 and cannot match any tracker entry.
    #[error("Invalid entry name")]
    InvalidName,

    #[error("Lookup failed: {0}")]
    Lookup(NodeError),

    #[error("Listing failed: {0}")]
    Listing(NodeError),

    #[error("Read failed: {0}")]
    Read(NodeError),

    /// Write access requested on the read-only mirror.
    #[error("Read-only filesystem")]
    ReadOnly,
}

impl FsError {
    /// Converts this error to a libc error code for FUSE.
    pub fn to_errno(&self) -> i32 {
        match self {
            FsError::InvalidInode(_) | FsError::InvalidName => libc::ENOENT,
            FsError::InvalidHandle(_) => libc::EBADF,
            FsError::Lookup(NodeError::NotADirectory)
            | FsError::Listing(NodeError::NotADirectory) => libc::ENOTDIR,
            FsError::Lookup(_) => libc::ENOENT,
            FsError::Read(NodeError::IsADirectory) => libc::EISDIR,
            FsError::Listing(_) | FsError::Read(_) => libc::EIO,
            FsError::ReadOnly => libc::EROFS,
        }
    }
}

/// Result type for FUSE operations.
pub type FsResult<T> = Result<T, FsError>;
