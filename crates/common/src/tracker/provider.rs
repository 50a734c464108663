use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A tracker project, shown as a directory under the mount root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

impl Project {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A tracker issue, shown as a file inside its project's directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub subject: String,
    /// Id of the project the issue was listed under
    pub project_id: u64,
}

impl Issue {
    pub fn new(id: u64, subject: impl Into<String>, project_id: u64) -> Self {
        Self {
            id,
            subject: subject.into(),
            project_id,
        }
    }
}

/// Failures reported by a [`Tracker`].
///
/// The node layer never retries; every variant surfaces to the calling
/// filesystem operation as-is.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// Network or protocol failure talking to the tracker
    #[error("transport error: {0}")]
    Transport(String),
    /// The tracker rejected our credentials
    #[error("authentication rejected: {0}")]
    Auth(String),
    /// The requested project or issue does not exist remotely
    #[error("not found: {0}")]
    NotFound(String),
}

/// The remote issue tracker as seen by the node hierarchy.
///
/// Every call is a fresh round trip; implementations must not cache.
/// Listings are returned in tracker order, which the nodes preserve.
#[async_trait]
pub trait Tracker: Send + Sync + 'static {
    /// List every project visible to the configured credentials
    async fn list_projects(&self) -> Result<Vec<Project>, TrackerError>;

    /// List the issues of a project
    ///
    /// # Arguments
    /// * `project_id` - The tracker's id for the project
    ///
    /// # Returns
    /// * `Err(TrackerError::NotFound)` - The project is unknown to the tracker
    async fn list_issues(&self, project_id: u64) -> Result<Vec<Issue>, TrackerError>;

    /// Fetch the textual body (description) of an issue
    async fn issue_body(&self, issue_id: u64) -> Result<String, TrackerError>;
}
