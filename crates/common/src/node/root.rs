use std::sync::Arc;

use parking_lot::RwLock;

use super::{DirEntry, EntryKind, NodeAttr, NodeError, ProjectNode, ROOT_IDENTIFIER};
use crate::tracker::{sanitize_component, Project, Tracker};

/// Last project listing seen by a root, swapped wholesale on every listing
type ListingSnapshot = Arc<[Project]>;

/// The mount root: one directory entry per tracker project.
///
/// Clones share the listing snapshot, so a mount should build exactly one
/// root and hand out clones of it.
#[derive(Clone)]
pub struct RootNode {
    tracker: Arc<dyn Tracker>,
    listing: Arc<RwLock<Option<ListingSnapshot>>>,
}

impl RootNode {
    pub fn new(tracker: Arc<dyn Tracker>) -> Self {
        Self {
            tracker,
            listing: Arc::new(RwLock::new(None)),
        }
    }

    pub fn attributes(&self) -> NodeAttr {
        NodeAttr::directory(ROOT_IDENTIFIER)
    }

    /// List every project, in the order the tracker returned them.
    ///
    /// A failed listing leaves the previous snapshot in place and is
    /// returned to the caller; no stale list is served in its stead.
    pub async fn list_children(&self) -> Result<Vec<DirEntry>, NodeError> {
        let projects = self.refresh().await?;

        Ok(projects
            .iter()
            .map(|p| DirEntry {
                identifier: p.id,
                name: sanitize_component(&p.name),
                kind: EntryKind::Directory,
            })
            .collect())
    }

    /// Resolve a project by its exact (case-sensitive) directory name.
    ///
    /// Names are matched against the last listing. If no listing has been
    /// taken yet one is fetched first, so a path can be opened directly
    /// after mounting; otherwise a miss is final until the next listing.
    pub async fn lookup_child(&self, name: &str) -> Result<ProjectNode, NodeError> {
        let snapshot = match self.snapshot() {
            Some(snapshot) => snapshot,
            None => self.refresh().await?,
        };

        snapshot
            .iter()
            .find(|p| sanitize_component(&p.name) == name)
            .map(|p| ProjectNode::new(p.id, self.tracker.clone()))
            .ok_or_else(|| NodeError::NotFound(name.to_string()))
    }

    /// The current listing snapshot, if any listing has succeeded
    pub fn snapshot(&self) -> Option<ListingSnapshot> {
        self.listing.read().clone()
    }

    async fn refresh(&self) -> Result<ListingSnapshot, NodeError> {
        let projects = self.tracker.list_projects().await.map_err(|e| {
            tracing::warn!("listing projects failed: {}", e);
            e
        })?;
        tracing::debug!(count = projects.len(), "listed projects");

        let snapshot: ListingSnapshot = projects.into();
        *self.listing.write() = Some(snapshot.clone());
        Ok(snapshot)
    }
}

impl std::fmt::Debug for RootNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootNode")
            .field("listed", &self.snapshot().map(|s| s.len()))
            .finish()
    }
}
