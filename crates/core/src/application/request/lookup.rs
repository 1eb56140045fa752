// Lookup Use Case - public tracking by code

use crate::domain::Request;
use crate::error::{AppError, Result};
use crate::port::RequestRepository;

/// Exact-match lookup; the newest record wins when a code is shared
pub async fn execute(repo: &dyn RequestRepository, tracking_id: &str) -> Result<Request> {
    let tracking_id = tracking_id.trim();

    repo.find_by_tracking_id(tracking_id)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("No request with tracking ID {}", tracking_id)))
}
