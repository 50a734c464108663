//! In-memory [`Tracker`] for tests and local experiments.
//!
//! Holds projects, issues and bodies behind a mutex, counts every call, and
//! can be told to fail specific calls so error paths are reachable without
//! a network.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::{Mutex, MutexGuard};

use super::provider::{Issue, Project, Tracker, TrackerError};

/// One tracker operation, used as the key for call counts and failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerCall {
    ListProjects,
    ListIssues(u64),
    IssueBody(u64),
}

#[derive(Debug, Default)]
struct MemoryState {
    projects: Vec<Project>,
    issues: Vec<Issue>,
    bodies: HashMap<u64, String>,
    failures: HashMap<TrackerCall, TrackerError>,
    calls: HashMap<TrackerCall, usize>,
}

#[derive(Debug, Default)]
pub struct MemoryTracker {
    state: Mutex<MemoryState>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, id: u64, name: &str) -> Self {
        self.add_project(id, name);
        self
    }

    pub fn with_issue(self, project_id: u64, id: u64, subject: &str, body: &str) -> Self {
        self.add_issue(project_id, id, subject, body);
        self
    }

    pub fn add_project(&self, id: u64, name: &str) {
        self.state.lock().projects.push(Project::new(id, name));
    }

    pub fn remove_project(&self, id: u64) {
        let mut state = self.state.lock();
        state.projects.retain(|p| p.id != id);
        state.issues.retain(|i| i.project_id != id);
    }

    pub fn add_issue(&self, project_id: u64, id: u64, subject: &str, body: &str) {
        let mut state = self.state.lock();
        state.issues.push(Issue::new(id, subject, project_id));
        state.bodies.insert(id, body.to_string());
    }

    pub fn set_body(&self, id: u64, body: &str) {
        self.state.lock().bodies.insert(id, body.to_string());
    }

    /// Make every subsequent `call` fail with `error` until cleared
    pub fn fail(&self, call: TrackerCall, error: TrackerError) {
        self.state.lock().failures.insert(call, error);
    }

    pub fn clear_failure(&self, call: TrackerCall) {
        self.state.lock().failures.remove(&call);
    }

    /// How many times `call` has been issued, failed attempts included
    pub fn calls(&self, call: TrackerCall) -> usize {
        self.state.lock().calls.get(&call).copied().unwrap_or(0)
    }

    fn begin(&self, call: TrackerCall) -> Result<MutexGuard<'_, MemoryState>, TrackerError> {
        let mut state = self.state.lock();
        *state.calls.entry(call).or_default() += 1;
        if let Some(err) = state.failures.get(&call).cloned() {
            return Err(err);
        }
        Ok(state)
    }
}

#[async_trait]
impl Tracker for MemoryTracker {
    async fn list_projects(&self) -> Result<Vec<Project>, TrackerError> {
        let state = self.begin(TrackerCall::ListProjects)?;
        Ok(state.projects.clone())
    }

    async fn list_issues(&self, project_id: u64) -> Result<Vec<Issue>, TrackerError> {
        let state = self.begin(TrackerCall::ListIssues(project_id))?;
        if !state.projects.iter().any(|p| p.id == project_id) {
            return Err(TrackerError::NotFound(format!("project {project_id}")));
        }

        Ok(state
            .issues
            .iter()
            .filter(|i| i.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn issue_body(&self, issue_id: u64) -> Result<String, TrackerError> {
        let state = self.begin(TrackerCall::IssueBody(issue_id))?;
        state
            .bodies
            .get(&issue_id)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(format!("issue {issue_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_listing_preserves_insertion_order() {
        let tracker = MemoryTracker::new()
            .with_project(3, "Gamma")
            .with_project(1, "Alpha")
            .with_project(2, "Beta");

        let names: Vec<_> = tracker
            .list_projects()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Gamma", "Alpha", "Beta"]);
    }

    #[tokio::test]
    async fn test_issues_are_scoped_to_project() {
        let tracker = MemoryTracker::new()
            .with_project(1, "Alpha")
            .with_project(2, "Beta")
            .with_issue(1, 10, "in alpha", "")
            .with_issue(2, 20, "in beta", "");

        let issues = tracker.list_issues(2).await.unwrap();
        assert_eq!(issues, vec![Issue::new(20, "in beta", 2)]);
    }

    #[tokio::test]
    async fn test_unknown_entities_are_not_found() {
        let tracker = MemoryTracker::new();
        assert!(matches!(
            tracker.list_issues(5).await,
            Err(TrackerError::NotFound(_))
        ));
        assert!(matches!(
            tracker.issue_body(5).await,
            Err(TrackerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failure_injection_and_counts() {
        let tracker = MemoryTracker::new().with_project(1, "Alpha");
        tracker.fail(
            TrackerCall::ListProjects,
            TrackerError::Auth("bad key".to_string()),
        );

        assert_eq!(
            tracker.list_projects().await,
            Err(TrackerError::Auth("bad key".to_string()))
        );

        tracker.clear_failure(TrackerCall::ListProjects);
        assert!(tracker.list_projects().await.is_ok());
        assert_eq!(tracker.calls(TrackerCall::ListProjects), 2);
        assert_eq!(tracker.calls(TrackerCall::ListIssues(1)), 0);
    }
}
