use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use super::Paging;
use crate::api::{ApiError, ApiRequest};
use common::tracker::Issue;

/// `GET /issues.json?project_id=..`
#[derive(Debug, Clone, Serialize)]
pub struct ListIssuesRequest {
    pub project_id: u64,
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListIssuesResponse {
    pub issues: Vec<IssueInfo>,
    #[serde(flatten)]
    pub paging: Paging,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueInfo {
    pub id: u64,
    #[serde(default)]
    pub subject: String,
    pub project: ProjectRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRef {
    pub id: u64,
}

impl From<IssueInfo> for Issue {
    fn from(info: IssueInfo) -> Self {
        Issue::new(info.id, info.subject, info.project.id)
    }
}

impl ApiRequest for ListIssuesRequest {
    type Response = ListIssuesResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("issues.json")?;
        Ok(client.get(full_url).query(&self))
    }
}
