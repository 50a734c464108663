use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use url::Url;

use super::v1::issue::GetIssueRequest;
use super::v1::issues::ListIssuesRequest;
use super::v1::projects::ListProjectsRequest;
use super::v1::PAGE_LIMIT;
use super::{ApiError, ApiRequest};
use common::tracker::{Issue, Project, Tracker, TrackerError};

/// Header Redmine reads the API key from
const API_KEY_HEADER: &str = "x-redmine-api-key";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Skip TLS certificate verification
    pub insecure: bool,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for a Redmine instance
#[derive(Debug, Clone)]
pub struct RedmineClient {
    pub remote: Url,
    client: Client,
}

impl RedmineClient {
    pub fn new(remote: &Url, api_key: &str, options: &ClientOptions) -> Result<Self, ApiError> {
        let mut api_key = HeaderValue::from_str(api_key).map_err(|_| ApiError::InvalidApiKey)?;
        api_key.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(API_KEY_HEADER, api_key);

        if options.insecure {
            tracing::warn!("TLS certificate verification disabled for {}", remote);
        }

        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(options.timeout)
            .danger_accept_invalid_certs(options.insecure)
            .build()?;

        Ok(Self {
            remote: Self::normalize_base(remote),
            client,
        })
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client)?;
        let response = request_builder.send().await?;

        if response.status().is_success() {
            Ok(response.json::<T::Response>().await?)
        } else {
            Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client for custom requests
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Fetch every project, following Redmine's offset paging
    pub async fn projects(&self) -> Result<Vec<Project>, ApiError> {
        let mut projects = Vec::new();
        loop {
            let page = self
                .call(ListProjectsRequest {
                    offset: projects.len() as u64,
                    limit: PAGE_LIMIT,
                })
                .await?;

            let fetched = page.projects.len();
            projects.extend(page.projects.into_iter().map(Project::from));
            if fetched == 0 || !page.paging.has_more(projects.len()) {
                break;
            }
        }
        Ok(projects)
    }

    /// Fetch every (open) issue of a project
    pub async fn issues(&self, project_id: u64) -> Result<Vec<Issue>, ApiError> {
        let mut issues = Vec::new();
        loop {
            let page = self
                .call(ListIssuesRequest {
                    project_id,
                    offset: issues.len() as u64,
                    limit: PAGE_LIMIT,
                })
                .await?;

            let fetched = page.issues.len();
            issues.extend(page.issues.into_iter().map(Issue::from));
            if fetched == 0 || !page.paging.has_more(issues.len()) {
                break;
            }
        }
        Ok(issues)
    }

    /// Fetch an issue's description; a missing description reads as empty
    pub async fn description(&self, issue_id: u64) -> Result<String, ApiError> {
        let response = self.call(GetIssueRequest { issue_id }).await?;
        Ok(response.issue.description.unwrap_or_default())
    }

    /// Relative joins drop the last path segment unless the base ends in `/`
    fn normalize_base(remote: &Url) -> Url {
        let mut base = remote.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);
        base
    }
}

#[async_trait]
impl Tracker for RedmineClient {
    async fn list_projects(&self) -> Result<Vec<Project>, TrackerError> {
        Ok(self.projects().await?)
    }

    async fn list_issues(&self, project_id: u64) -> Result<Vec<Issue>, TrackerError> {
        Ok(self.issues(project_id).await?)
    }

    async fn issue_body(&self, issue_id: u64) -> Result<String, TrackerError> {
        Ok(self.description(issue_id).await?)
    }
}
