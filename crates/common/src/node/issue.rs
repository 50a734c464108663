use std::sync::Arc;

use super::{NodeAttr, NodeError};
use crate::tracker::Tracker;

/// An issue file whose content is the issue body
#[derive(Clone)]
pub struct IssueNode {
    id: u64,
    tracker: Arc<dyn Tracker>,
}

impl IssueNode {
    pub fn new(id: u64, tracker: Arc<dyn Tracker>) -> Self {
        Self { id, tracker }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn attributes(&self) -> NodeAttr {
        NodeAttr::file(self.id)
    }

    /// Fetch the body from the tracker. Every call is a round trip.
    pub async fn read_all(&self) -> Result<Vec<u8>, NodeError> {
        let body = self.tracker.issue_body(self.id).await.map_err(|e| {
            tracing::warn!(issue = self.id, "fetching issue body failed: {}", e);
            e
        })?;
        Ok(body.into_bytes())
    }
}

impl std::fmt::Debug for IssueNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueNode").field("id", &self.id).finish()
    }
}
