//! Open directory and file handles.
//!
//! A directory handle holds the listing taken at `opendir`, so paging
//! through `readdir` never re-fetches mid-iteration. A file handle holds the
//! body fetched at `open`. Both are dropped on release; nothing outlives
//! the handle.

use std::collections::HashMap;

use fuser::FileType;

/// One entry handed to `readdir`, `.` and `..` included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    pub inode: u64,
    pub file_type: FileType,
    pub name: String,
}

#[derive(Debug)]
pub enum FsHandle {
    Dir(Vec<DirListing>),
    File(Vec<u8>),
}

impl FsHandle {
    pub fn as_dir(&self) -> Option<&[DirListing]> {
        match self {
            FsHandle::Dir(entries) => Some(entries),
            FsHandle::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&[u8]> {
        match self {
            FsHandle::File(data) => Some(data),
            FsHandle::Dir(_) => None,
        }
    }
}

/// Handle table with auto-incrementing ids. 0 is never issued.
#[derive(Debug)]
pub struct HandleTable {
    handles: HashMap<u64, FsHandle>,
    next_handle: u64,
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleTable {
    pub fn new() -> Self {
        Self {
            handles: HashMap::new(),
            next_handle: 1,
        }
    }

    pub fn insert(&mut self, handle: FsHandle) -> u64 {
        let fh = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(fh, handle);
        fh
    }

    pub fn get(&self, fh: u64) -> Option<&FsHandle> {
        self.handles.get(&fh)
    }

    pub fn remove(&mut self, fh: u64) -> Option<FsHandle> {
        self.handles.remove(&fh)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
