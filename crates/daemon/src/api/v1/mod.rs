//! Redmine REST endpoints used by the filesystem.

pub mod issue;
pub mod issues;
pub mod projects;

use serde::Deserialize;

/// Page size requested from list endpoints (Redmine caps it at 100)
pub const PAGE_LIMIT: u64 = 100;

/// Paging fields Redmine attaches to list responses
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub total_count: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

impl Paging {
    /// Whether more items remain after `seen` have been collected
    pub fn has_more(&self, seen: usize) -> bool {
        self.total_count
            .is_some_and(|total| (seen as u64) < total)
    }
}
