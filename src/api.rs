use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::check::CheckSpec;


pub const CHECKS_ENDPOINT: &str = "/api/v1/checks/";


#[derive(Debug, Error)]
pub enum ApiError {
    /// The service rejected the request and told us why.
    #[error("service returned an error: {0}")]
    Remote(String),
    #[error("request to the service failed")]
    Request(#[from] reqwest::Error),
    #[error("unexpected response from the service: {0}")]
    MalformedResponse(String),
}


/// Absent fields are left out of the payload entirely.
#[derive(Debug, Serialize)]
struct CreateCheckRequest<'a> {
    api_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a str>,
    #[serde(rename = "timeout", skip_serializing_if = "Option::is_none")]
    period: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    grace: Option<u64>,
}

impl<'a> CreateCheckRequest<'a> {
    fn new(api_key: &'a str, spec: &'a CheckSpec) -> Self
    {
        CreateCheckRequest {
            api_key,
            name: spec.name.as_deref().filter(|s| !s.is_empty()),
            tags: spec.tags.as_deref().filter(|s| !s.is_empty()),
            period: spec.period,
            grace: spec.grace,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateCheckResponse {
    ping_url: Option<String>,
    error: Option<String>,
}


/// Client for the check management API.
pub struct ApiClient {
    http: reqwest::Client,
    checks_url: String,
    api_key: String,
}

impl ApiClient {

    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> Self
    {
        ApiClient {
            http,
            checks_url: format!("{}{}", base_url.trim_end_matches('/'), CHECKS_ENDPOINT),
            api_key: api_key.to_string(),
        }
    }

    /// Create a new check and return its ping URL.
    pub async fn create_check(&self, spec: &CheckSpec) -> Result<String, ApiError>
    {
        debug!(?spec, "creating check at {}", self.checks_url);
        let payload = CreateCheckRequest::new(&self.api_key, spec);
        let response = self.http.post(&self.checks_url)
            .json(&payload)
            .send().await?;
        let status = response.status();
        let body = response.text().await?;
        parse_create_response(status, &body)
    }

}

fn parse_create_response(status: StatusCode, body: &str) -> Result<String, ApiError>
{
    let response: CreateCheckResponse =
        serde_json::from_str(body)
        .map_err(|e| ApiError::MalformedResponse(format!("HTTP status {}: {}", status, e)))?;

    if let Some(error) = response.error {
        return Err(ApiError::Remote(error));
    }

    match response.ping_url {
        Some(ping_url) if status.is_success() => Ok(ping_url),
        Some(_) =>
            Err(ApiError::MalformedResponse(format!("HTTP status {}", status))),
        None =>
            Err(ApiError::MalformedResponse(format!("HTTP status {}, response has no ping_url", status))),
    }
}
