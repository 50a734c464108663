use std::fmt;
use std::sync::Arc;

use clap::Args;
use comfy_table::Table;

use common::node::{DirEntry, NodeError, RootNode};
use redminefs::api::ApiError;
use redminefs::state::StateError;

/// List projects as they appear at the mount root
#[derive(Args, Debug, Clone)]
pub struct Projects;

#[derive(Debug)]
pub struct ProjectsOutput {
    pub projects: Vec<DirEntry>,
}

impl fmt::Display for ProjectsOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.projects.is_empty() {
            return write!(f, "No projects found");
        }

        let mut table = Table::new();
        table.set_header(vec!["ID", "DIRECTORY"]);
        for p in &self.projects {
            table.add_row(vec![p.identifier.to_string(), p.name.clone()]);
        }
        write!(f, "{table}")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectsError {
    #[error("{0}")]
    State(#[from] StateError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("listing failed: {0}")]
    Node(#[from] NodeError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Projects {
    type Error = ProjectsError;
    type Output = ProjectsOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let root = RootNode::new(Arc::new(state.settings.client()?));

        Ok(ProjectsOutput {
            projects: root.list_children().await?,
        })
    }
}
