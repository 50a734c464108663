//! Redmine REST API client.
//!
//! Each endpoint is a request type implementing [`ApiRequest`]; the
//! [`RedmineClient`] sends them and implements [`common::tracker::Tracker`]
//! on top.

mod client;
mod error;
pub mod v1;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

pub use client::{ClientOptions, RedmineClient};
pub use error::ApiError;

/// A request against the tracker API
pub trait ApiRequest {
    type Response: DeserializeOwned;

    /// Build the HTTP request. `base_url` always ends with a `/`, so paths
    /// are joined relative to it.
    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError>;
}
