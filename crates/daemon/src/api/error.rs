use reqwest::StatusCode;

use common::tracker::TrackerError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("API key contains characters not allowed in a header")]
    InvalidApiKey,
}

impl From<ApiError> for TrackerError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::HttpStatus(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, _) => {
                TrackerError::Auth(e.to_string())
            }
            ApiError::InvalidApiKey => TrackerError::Auth(e.to_string()),
            ApiError::HttpStatus(StatusCode::NOT_FOUND, _) => TrackerError::NotFound(e.to_string()),
            ApiError::Http(_) | ApiError::HttpStatus(..) | ApiError::Url(_) => {
                TrackerError::Transport(e.to_string())
            }
        }
    }
}
