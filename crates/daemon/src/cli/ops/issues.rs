use std::fmt;
use std::sync::Arc;

use clap::Args;
use owo_colors::OwoColorize;

use common::node::{DirEntry, NodeError, ProjectNode, RootNode};
use common::tracker::Tracker;
use redminefs::api::ApiError;
use redminefs::state::StateError;

/// List the issue files of a project
#[derive(Args, Debug, Clone)]
pub struct Issues {
    /// Project id or directory name (defaults to `project` from settings)
    pub project: Option<String>,
}

#[derive(Debug)]
pub struct IssuesOutput {
    pub project_id: u64,
    pub issues: Vec<DirEntry>,
}

impl fmt::Display for IssuesOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "No open issues in project {}", self.project_id);
        }

        writeln!(
            f,
            "{} {}",
            "Project".dimmed(),
            self.project_id.to_string().bold()
        )?;
        let names: Vec<&str> = self.issues.iter().map(|i| i.name.as_str()).collect();
        write!(f, "{}", names.join("\n"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IssuesError {
    #[error("{0}")]
    State(#[from] StateError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Node(#[from] NodeError),
    #[error("no project given and none set in settings")]
    NoProject,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Issues {
    type Error = IssuesError;
    type Output = IssuesOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let tracker: Arc<dyn Tracker> = Arc::new(state.settings.client()?);

        let project_id = match (&self.project, state.settings.project) {
            (Some(project), _) => resolve_project(tracker.clone(), project).await?,
            (None, Some(id)) => id,
            (None, None) => return Err(IssuesError::NoProject),
        };

        let project = ProjectNode::new(project_id, tracker);
        Ok(IssuesOutput {
            project_id,
            issues: project.list_children().await?,
        })
    }
}

/// A numeric argument is a project id; anything else is looked up by name
async fn resolve_project(tracker: Arc<dyn Tracker>, project: &str) -> Result<u64, NodeError> {
    if let Ok(id) = project.parse::<u64>() {
        return Ok(id);
    }
    let root = RootNode::new(tracker);
    Ok(root.lookup_child(project).await?.id())
}
