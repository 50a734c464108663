use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use super::Paging;
use crate::api::{ApiError, ApiRequest};
use common::tracker::Project;

/// `GET /projects.json`
#[derive(Debug, Clone, Serialize)]
pub struct ListProjectsRequest {
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListProjectsResponse {
    pub projects: Vec<ProjectInfo>,
    #[serde(flatten)]
    pub paging: Paging,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInfo {
    pub id: u64,
    pub name: String,
}

impl From<ProjectInfo> for Project {
    fn from(info: ProjectInfo) -> Self {
        Project::new(info.id, info.name)
    }
}

impl ApiRequest for ListProjectsRequest {
    type Response = ListProjectsResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join("projects.json")?;
        Ok(client.get(full_url).query(&self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url() {
        let base = Url::parse("https://tracker.example.com/redmine/").unwrap();
        let request = ListProjectsRequest {
            offset: 100,
            limit: 100,
        }
        .build_request(&base, &Client::new())
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://tracker.example.com/redmine/projects.json?offset=100&limit=100"
        );
    }

    #[test]
    fn test_decode_response() {
        let body = r#"{
            "projects": [
                {"id": 1, "name": "Demo", "identifier": "demo", "status": 1},
                {"id": 3, "name": "Ops", "identifier": "ops", "parent": {"id": 1, "name": "Demo"}}
            ],
            "total_count": 2,
            "offset": 0,
            "limit": 25
        }"#;

        let response: ListProjectsResponse = serde_json::from_str(body).unwrap();
        let projects: Vec<Project> = response.projects.into_iter().map(Project::from).collect();
        assert_eq!(projects, vec![Project::new(1, "Demo"), Project::new(3, "Ops")]);
        assert_eq!(response.paging.total_count, Some(2));
    }
}
