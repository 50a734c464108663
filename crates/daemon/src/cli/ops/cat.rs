use std::fmt;
use std::sync::Arc;

use clap::Args;

use common::node::{IssueNode, NodeError};
use common::tracker::{parse_issue_id, EntryNameError};
use redminefs::api::ApiError;
use redminefs::state::StateError;

/// Print an issue body, exactly as reading its file would
#[derive(Args, Debug, Clone)]
pub struct Cat {
    /// Issue id or file name (`<id>-<subject>`)
    pub issue: String,
}

#[derive(Debug)]
pub struct CatOutput {
    pub body: String,
}

impl fmt::Display for CatOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.body)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatError {
    #[error("{0}")]
    State(#[from] StateError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("invalid issue: {0}")]
    Name(#[from] EntryNameError),
    #[error("read failed: {0}")]
    Node(#[from] NodeError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Cat {
    type Error = CatError;
    type Output = CatOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let issue_id = parse_issue_id(&self.issue)?;

        let state = ctx.state()?;
        let issue = IssueNode::new(issue_id, Arc::new(state.settings.client()?));
        let body = issue.read_all().await?;

        Ok(CatOutput {
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}
