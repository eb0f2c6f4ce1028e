// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::AnalysisConfig;

/// Create a configured asynchronous HTTP client for the analysis API.
pub fn create_async_client(config: &AnalysisConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert("OpenAI-Beta", HeaderValue::from_static("assistants=v2"));

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Turn a non-success response into an analysis error carrying the body.
pub async fn ensure_success(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::analysis(format!(
        "{action} failed with {status}: {}",
        body.trim()
    )))
}
