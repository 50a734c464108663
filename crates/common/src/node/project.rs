use std::sync::Arc;

use super::{DirEntry, EntryKind, IssueNode, NodeAttr, NodeError};
use crate::tracker::{issue_entry_name, parse_issue_id, Tracker};

/// A project directory: one file per issue.
#[derive(Clone)]
pub struct ProjectNode {
    id: u64,
    tracker: Arc<dyn Tracker>,
}

impl ProjectNode {
    pub fn new(id: u64, tracker: Arc<dyn Tracker>) -> Self {
        Self { id, tracker }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn attributes(&self) -> NodeAttr {
        NodeAttr::directory(self.id)
    }

    /// List the project's issues as `"<id>-<subject>"` files
    pub async fn list_children(&self) -> Result<Vec<DirEntry>, NodeError> {
        let issues = self.tracker.list_issues(self.id).await.map_err(|e| {
            tracing::warn!(project = self.id, "listing issues failed: {}", e);
            e
        })?;
        tracing::debug!(project = self.id, count = issues.len(), "listed issues");

        Ok(issues
            .into_iter()
            .map(|issue| DirEntry {
                identifier: issue.id,
                name: issue_entry_name(issue.id, &issue.subject),
                kind: EntryKind::File,
            })
            .collect())
    }

    /// Resolve an issue from the numeric prefix of its entry name.
    ///
    /// No remote call is made; whether the issue exists is only known once
    /// it is read.
    pub fn lookup_child(&self, name: &str) -> Result<IssueNode, NodeError> {
        let id = parse_issue_id(name)?;
        Ok(IssueNode::new(id, self.tracker.clone()))
    }
}

impl std::fmt::Debug for ProjectNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectNode").field("id", &self.id).finish()
    }
}
