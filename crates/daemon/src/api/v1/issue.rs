use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use url::Url;

use crate::api::{ApiError, ApiRequest};

/// `GET /issues/<id>.json`
#[derive(Debug, Clone)]
pub struct GetIssueRequest {
    pub issue_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetIssueResponse {
    pub issue: IssueDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueDetail {
    pub id: u64,
    #[serde(default)]
    pub subject: String,
    /// Absent or null when the issue has no description
    #[serde(default)]
    pub description: Option<String>,
}

impl ApiRequest for GetIssueRequest {
    type Response = GetIssueResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("issues/{}.json", self.issue_id))?;
        Ok(client.get(full_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url() {
        let base = Url::parse("https://tracker.example.com/").unwrap();
        let request = GetIssueRequest { issue_id: 42 }
            .build_request(&base, &Client::new())
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://tracker.example.com/issues/42.json"
        );
    }

    #[test]
    fn test_decode_null_description() {
        let body = r#"{"issue": {"id": 7, "subject": "Empty", "description": null}}"#;
        let response: GetIssueResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.issue.id, 7);
        assert_eq!(response.issue.description, None);

        let body = r#"{"issue": {"id": 8, "subject": "No field"}}"#;
        let response: GetIssueResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.issue.description, None);
    }

    #[test]
    fn test_decode_description_verbatim() {
        let body = r#"{"issue": {"id": 42, "subject": "Fix bug", "description": "steps\r\nto reproduce"}}"#;
        let response: GetIssueResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.issue.description.as_deref(),
            Some("steps\r\nto reproduce")
        );
    }
}
