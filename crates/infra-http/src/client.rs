// Shared reqwest client setup + error mapping

use cctv_core::error::{AppError, Result};
use std::time::Duration;

const USER_AGENT: &str = concat!("cctv-request-service/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client with a request timeout
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Convert reqwest::Error to AppError::Upstream
pub(crate) fn map_reqwest_error(service: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Upstream(format!("{} timed out", service))
    } else if err.is_connect() {
        AppError::Upstream(format!("{} unreachable: {}", service, err))
    } else if err.is_decode() {
        AppError::Upstream(format!("{} returned an unreadable body: {}", service, err))
    } else {
        AppError::Upstream(format!("{} request failed: {}", service, err))
    }
}

/// Turn a non-2xx response into an Upstream error carrying the body text
pub(crate) async fn error_for_status(
    service: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Upstream(format!(
        "{} returned HTTP {}: {}",
        service,
        status.as_u16(),
        body.trim()
    )))
}
