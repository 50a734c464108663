//! FUSE filesystem over the tracker node tree
//!
//! The kernel speaks inodes and handles; the node tree speaks names and
//! tracker ids. `RedmineFs` translates between the two. Every operation is
//! implemented as an inherent method returning [`FsResult`], and the
//! [`Filesystem`] impl only turns those results into replies.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use fuser::{
    FileAttr, FileType, Filesystem, KernelConfig, ReplyAttr, ReplyData, ReplyDirectory,
    ReplyEmpty, ReplyEntry, ReplyOpen, ReplyStatfs, Request,
};
use tokio::runtime::Handle;

use common::node::{EntryKind, IssueNode, Node, NodeAttr, NodeError, ProjectNode, RootNode};
use common::tracker::Tracker;

use super::error::{FsError, FsResult};
use super::handles::{DirListing, FsHandle, HandleTable};
use super::inode_table::{InodeTable, NodeKey};

/// Block size reported in attributes and statfs
const BLOCK_SIZE: u32 = 512;

/// Longest name the mount accepts.
///
/// Entry names are not truncated to fit: an issue whose `<id>-<subject>`
/// runs past this limit is still listed, but the kernel refuses to open it
/// with `ENAMETOOLONG`.
const MAX_NAME_LEN: u32 = 255;

/// FUSE filesystem presenting a tracker as projects and issue files
pub struct RedmineFs {
    tracker: Arc<dyn Tracker>,
    /// Single root shared by every lookup so project names resolve against
    /// the last listing the user saw
    root: RootNode,
    inodes: InodeTable,
    handles: HandleTable,
    /// Runtime the tracker futures are driven on
    runtime: Handle,
    attr_ttl: Duration,
    mounted_at: SystemTime,
    uid: u32,
    gid: u32,
}

impl RedmineFs {
    pub fn new(tracker: Arc<dyn Tracker>, runtime: Handle, attr_ttl: Duration) -> Self {
        let root = RootNode::new(tracker.clone());
        Self {
            tracker,
            root,
            inodes: InodeTable::new(),
            handles: HandleTable::new(),
            runtime,
            attr_ttl,
            mounted_at: SystemTime::now(),
            uid: unsafe { libc::getuid() },
            gid: unsafe { libc::getgid() },
        }
    }

    /// Resolve `name` under `parent`, assigning the child an inode
    pub fn lookup_entry(&mut self, parent: u64, name: &OsStr) -> FsResult<FileAttr> {
        let name = name.to_str().ok_or(FsError::InvalidName)?;
        let node = self.node(parent)?;

        let child = self
            .runtime
            .block_on(node.lookup_child(name))
            .map_err(FsError::Lookup)?;

        let inode = self.inodes.get_or_create(NodeKey::of(&child));
        Ok(self.file_attr(inode, child.attributes()))
    }

    pub fn attr(&self, ino: u64) -> FsResult<FileAttr> {
        let node = self.node(ino)?;
        Ok(self.file_attr(ino, node.attributes()))
    }

    /// List a directory into a new handle.
    ///
    /// The listing is fetched once here; `readdir` pages through this copy.
    pub fn open_dir(&mut self, ino: u64) -> FsResult<u64> {
        let node = self.node(ino)?;
        if !node.is_dir() {
            return Err(FsError::Listing(NodeError::NotADirectory));
        }

        let children = self
            .runtime
            .block_on(node.list_children())
            .map_err(FsError::Listing)?;

        let mut listing = Vec::with_capacity(children.len() + 2);
        listing.push(DirListing {
            inode: ino,
            file_type: FileType::Directory,
            name: ".".to_string(),
        });
        listing.push(DirListing {
            // Projects and the root itself all sit directly under the root
            inode: InodeTable::ROOT_INODE,
            file_type: FileType::Directory,
            name: "..".to_string(),
        });
        for child in children {
            listing.push(DirListing {
                inode: self.inodes.get_or_create(NodeKey::of_entry(&child)),
                file_type: file_type(child.kind),
                name: child.name,
            });
        }

        tracing::debug!(inode = ino, entries = listing.len(), "opened directory");
        Ok(self.handles.insert(FsHandle::Dir(listing)))
    }

    /// Entries of an open directory starting at `offset`
    pub fn dir_entries(&self, fh: u64, offset: i64) -> FsResult<&[DirListing]> {
        let listing = self
            .handles
            .get(fh)
            .and_then(FsHandle::as_dir)
            .ok_or(FsError::InvalidHandle(fh))?;

        let start = usize::try_from(offset).unwrap_or(0).min(listing.len());
        Ok(&listing[start..])
    }

    /// Open an issue for reading, fetching its whole body.
    pub fn open_file(&mut self, ino: u64, flags: i32) -> FsResult<u64> {
        if flags & libc::O_ACCMODE != libc::O_RDONLY {
            return Err(FsError::ReadOnly);
        }

        let node = self.node(ino)?;
        let body = self
            .runtime
            .block_on(node.read_all())
            .map_err(FsError::Read)?;

        tracing::debug!(inode = ino, bytes = body.len(), "opened file");
        Ok(self.handles.insert(FsHandle::File(body)))
    }

    /// Up to `size` bytes of an open file starting at `offset`
    pub fn read_file(&self, fh: u64, offset: i64, size: u32) -> FsResult<&[u8]> {
        let body = self
            .handles
            .get(fh)
            .and_then(FsHandle::as_file)
            .ok_or(FsError::InvalidHandle(fh))?;

        let start = usize::try_from(offset).unwrap_or(0).min(body.len());
        let end = start.saturating_add(size as usize).min(body.len());
        Ok(&body[start..end])
    }

    /// Drop an open file or directory handle
    pub fn release_handle(&mut self, fh: u64) -> FsResult<()> {
        self.handles
            .remove(fh)
            .map(|_| ())
            .ok_or(FsError::InvalidHandle(fh))
    }

    /// Check access for `mask`; any write request is refused
    pub fn check_access(&self, ino: u64, mask: i32) -> FsResult<()> {
        self.node(ino)?;
        if mask & libc::W_OK != 0 {
            return Err(FsError::ReadOnly);
        }
        Ok(())
    }

    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    /// Rebuild the node an inode stands for
    fn node(&self, ino: u64) -> FsResult<Node> {
        let key = self.inodes.get_key(ino).ok_or(FsError::InvalidInode(ino))?;
        Ok(match key {
            NodeKey::Root => Node::Root(self.root.clone()),
            NodeKey::Project(id) => Node::Project(ProjectNode::new(id, self.tracker.clone())),
            NodeKey::Issue(id) => Node::Issue(IssueNode::new(id, self.tracker.clone())),
        })
    }

    fn file_attr(&self, ino: u64, attr: NodeAttr) -> FileAttr {
        let kind = file_type(attr.kind);
        FileAttr {
            ino,
            size: attr.size,
            blocks: attr.size.div_ceil(u64::from(BLOCK_SIZE)),
            atime: self.mounted_at,
            mtime: self.mounted_at,
            ctime: self.mounted_at,
            crtime: self.mounted_at,
            kind,
            perm: attr.perm,
            nlink: if kind == FileType::Directory { 2 } else { 1 },
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: BLOCK_SIZE,
            flags: 0,
        }
    }
}

fn file_type(kind: EntryKind) -> FileType {
    match kind {
        EntryKind::Directory => FileType::Directory,
        EntryKind::File => FileType::RegularFile,
    }
}

impl Filesystem for RedmineFs {
    fn init(
        &mut self,
        _req: &Request<'_>,
        _config: &mut KernelConfig,
    ) -> Result<(), libc::c_int> {
        tracing::info!("FUSE filesystem initialized");
        Ok(())
    }

    fn destroy(&mut self) {
        tracing::info!("FUSE filesystem destroyed");
    }

    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        tracing::trace!(parent, ?name, "lookup");
        match self.lookup_entry(parent, name) {
            Ok(attr) => reply.entry(&self.attr_ttl, &attr, 0),
            Err(e) => {
                tracing::debug!(parent, ?name, "lookup failed: {}", e);
                reply.error(e.to_errno());
            }
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        tracing::trace!(inode = ino, "getattr");
        match self.attr(ino) {
            Ok(attr) => reply.attr(&self.attr_ttl, &attr),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn opendir(&mut self, _req: &Request<'_>, ino: u64, _flags: i32, reply: ReplyOpen) {
        tracing::trace!(inode = ino, "opendir");
        match self.open_dir(ino) {
            Ok(fh) => reply.opened(fh, 0),
            Err(e) => {
                tracing::warn!(inode = ino, "opendir failed: {}", e);
                reply.error(e.to_errno());
            }
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        tracing::trace!(inode = ino, fh, offset, "readdir");
        let entries = match self.dir_entries(fh, offset) {
            Ok(entries) => entries,
            Err(e) => {
                reply.error(e.to_errno());
                return;
            }
        };

        for (i, entry) in entries.iter().enumerate() {
            let next_offset = offset + i as i64 + 1;
            if reply.add(entry.inode, next_offset, entry.file_type, &entry.name) {
                break;
            }
        }
        reply.ok();
    }

    fn releasedir(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        fh: u64,
        _flags: i32,
        reply: ReplyEmpty,
    ) {
        match self.release_handle(fh) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        tracing::trace!(inode = ino, flags, "open");
        match self.open_file(ino, flags) {
            // Reported sizes are placeholders; direct I/O keeps the kernel
            // from truncating reads at the advertised size.
            Ok(fh) => reply.opened(fh, fuser::consts::FOPEN_DIRECT_IO),
            Err(e) => {
                tracing::warn!(inode = ino, "open failed: {}", e);
                reply.error(e.to_errno());
            }
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        tracing::trace!(inode = ino, fh, offset, size, "read");
        match self.read_file(fh, offset, size) {
            Ok(data) => reply.data(data),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn release(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        match self.release_handle(fh) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn access(&mut self, _req: &Request<'_>, ino: u64, mask: i32, reply: ReplyEmpty) {
        match self.check_access(ino, mask) {
            Ok(()) => reply.ok(),
            Err(e) => reply.error(e.to_errno()),
        }
    }

    fn statfs(&mut self, _req: &Request<'_>, _ino: u64, reply: ReplyStatfs) {
        reply.statfs(
            0,
            0,
            0,
            self.inodes.len() as u64,
            0,
            BLOCK_SIZE,
            MAX_NAME_LEN,
            BLOCK_SIZE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::tracker::{MemoryTracker, TrackerCall, TrackerError};
    use tokio::runtime::Runtime;

    // The adapter blocks on the runtime itself, so these tests run on a
    // plain thread with their own runtime instead of `#[tokio::test]`.
    fn mount(tracker: &Arc<MemoryTracker>, runtime: &Runtime) -> RedmineFs {
        RedmineFs::new(tracker.clone(), runtime.handle().clone(), Duration::from_secs(1))
    }

    fn names(entries: &[DirListing]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_root_attributes() {
        let runtime = Runtime::new().unwrap();
        let tracker = Arc::new(MemoryTracker::new());
        let fs = mount(&tracker, &runtime);

        let attr = fs.attr(InodeTable::ROOT_INODE).unwrap();
        assert_eq!(attr.kind, FileType::Directory);
        assert_eq!(attr.perm, 0o555);
        assert_eq!(attr.nlink, 2);
        assert_eq!(tracker.calls(TrackerCall::ListProjects), 0);
    }

    #[test]
    fn test_unknown_inode() {
        let runtime = Runtime::new().unwrap();
        let tracker = Arc::new(MemoryTracker::new());
        let fs = mount(&tracker, &runtime);

        assert!(matches!(fs.attr(77), Err(FsError::InvalidInode(77))));
    }

    #[test]
    fn test_readdir_offsets() {
        let runtime = Runtime::new().unwrap();
        let tracker = Arc::new(
            MemoryTracker::new()
                .with_project(1, "Alpha")
                .with_project(2, "Beta"),
        );
        let mut fs = mount(&tracker, &runtime);

        let fh = fs.open_dir(InodeTable::ROOT_INODE).unwrap();
        assert_eq!(
            names(fs.dir_entries(fh, 0).unwrap()),
            vec![".", "..", "Alpha", "Beta"]
        );
        assert_eq!(names(fs.dir_entries(fh, 3).unwrap()), vec!["Beta"]);
        assert!(fs.dir_entries(fh, 4).unwrap().is_empty());
        assert!(fs.dir_entries(fh, 100).unwrap().is_empty());

        // Paging never goes back to the tracker
        assert_eq!(tracker.calls(TrackerCall::ListProjects), 1);

        fs.release_handle(fh).unwrap();
        assert!(matches!(
            fs.dir_entries(fh, 0),
            Err(FsError::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_read_slices_body() {
        let runtime = Runtime::new().unwrap();
        let tracker = Arc::new(
            MemoryTracker::new()
                .with_project(1, "Demo")
                .with_issue(1, 42, "Fix bug", "steps to reproduce"),
        );
        let mut fs = mount(&tracker, &runtime);

        let project = fs.lookup_entry(InodeTable::ROOT_INODE, OsStr::new("Demo")).unwrap();
        let issue = fs.lookup_entry(project.ino, OsStr::new("42-Fix bug")).unwrap();
        assert_eq!(issue.kind, FileType::RegularFile);
        assert_eq!(issue.size, 1000);

        let fh = fs.open_file(issue.ino, libc::O_RDONLY).unwrap();
        assert_eq!(fs.read_file(fh, 0, 5).unwrap(), b"steps");
        assert_eq!(fs.read_file(fh, 6, 100).unwrap(), b"to reproduce");
        assert!(fs.read_file(fh, 500, 10).unwrap().is_empty());
        assert_eq!(tracker.calls(TrackerCall::IssueBody(42)), 1);

        fs.release_handle(fh).unwrap();
        assert_eq!(fs.open_handles(), 0);
    }

    #[test]
    fn test_write_open_is_refused() {
        let runtime = Runtime::new().unwrap();
        let tracker = Arc::new(
            MemoryTracker::new()
                .with_project(1, "Demo")
                .with_issue(1, 42, "Fix bug", "body"),
        );
        let mut fs = mount(&tracker, &runtime);

        let project = fs.lookup_entry(InodeTable::ROOT_INODE, OsStr::new("Demo")).unwrap();
        let issue = fs.lookup_entry(project.ino, OsStr::new("42-Fix bug")).unwrap();

        let err = fs.open_file(issue.ino, libc::O_RDWR).unwrap_err();
        assert_eq!(err.to_errno(), libc::EROFS);
        let err = fs.check_access(issue.ino, libc::W_OK).unwrap_err();
        assert_eq!(err.to_errno(), libc::EROFS);
        fs.check_access(issue.ino, libc::R_OK).unwrap();
        assert_eq!(tracker.calls(TrackerCall::IssueBody(42)), 0);
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let runtime = Runtime::new().unwrap();
        let tracker = Arc::new(MemoryTracker::new().with_project(1, "Demo"));
        let mut fs = mount(&tracker, &runtime);

        let err = fs.open_file(InodeTable::ROOT_INODE, libc::O_RDONLY).unwrap_err();
        assert_eq!(err.to_errno(), libc::EISDIR);
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let runtime = Runtime::new().unwrap();
        let tracker = Arc::new(
            MemoryTracker::new()
                .with_project(1, "Demo")
                .with_issue(1, 42, "Fix bug", "body"),
        );
        let mut fs = mount(&tracker, &runtime);

        let project = fs.lookup_entry(InodeTable::ROOT_INODE, OsStr::new("Demo")).unwrap();
        let issue = fs.lookup_entry(project.ino, OsStr::new("42-Fix bug")).unwrap();

        assert_eq!(fs.open_dir(issue.ino).unwrap_err().to_errno(), libc::ENOTDIR);
        assert_eq!(
            fs.lookup_entry(issue.ino, OsStr::new("x"))
                .unwrap_err()
                .to_errno(),
            libc::ENOTDIR
        );
    }

    #[test]
    fn test_failed_read_is_eio() {
        let runtime = Runtime::new().unwrap();
        let tracker = Arc::new(
            MemoryTracker::new()
                .with_project(1, "Demo")
                .with_issue(1, 42, "Fix bug", "body"),
        );
        let mut fs = mount(&tracker, &runtime);

        let project = fs.lookup_entry(InodeTable::ROOT_INODE, OsStr::new("Demo")).unwrap();
        let issue = fs.lookup_entry(project.ino, OsStr::new("42-Fix bug")).unwrap();

        tracker.fail(
            TrackerCall::IssueBody(42),
            TrackerError::Transport("timed out".to_string()),
        );
        let err = fs.open_file(issue.ino, libc::O_RDONLY).unwrap_err();
        assert_eq!(err.to_errno(), libc::EIO);
        assert_eq!(fs.open_handles(), 0);
    }

    #[test]
    fn test_same_inode_across_lookups() {
        let runtime = Runtime::new().unwrap();
        let tracker = Arc::new(
            MemoryTracker::new()
                .with_project(42, "Answer")
                .with_issue(42, 42, "Same id", "body"),
        );
        let mut fs = mount(&tracker, &runtime);

        let first = fs.lookup_entry(InodeTable::ROOT_INODE, OsStr::new("Answer")).unwrap();
        let second = fs.lookup_entry(InodeTable::ROOT_INODE, OsStr::new("Answer")).unwrap();
        assert_eq!(first.ino, second.ino);

        let issue = fs.lookup_entry(first.ino, OsStr::new("42-Same id")).unwrap();
        assert_ne!(issue.ino, first.ino);
    }
}
