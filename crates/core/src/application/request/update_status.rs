// Update Status Use Case

use crate::domain::{RequestId, RequestStatus, StatusHistoryEntry, TransitionPolicy};
use crate::error::{AppError, Result};
use crate::port::{RequestRepository, TimeProvider};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub id: RequestId,
    pub status: RequestStatus,
    #[serde(default)]
    pub note: Option<String>,
}

/// Note recorded when staff leave the note empty
pub fn default_note(status: RequestStatus) -> String {
    format!("Status changed to {}", status)
}

/// Execute update-status use case
///
/// Reads the current status only to apply `policy`; the write itself is
/// unconditional, so a concurrent update between read and write is clobbered.
pub async fn execute(
    repo: &dyn RequestRepository,
    time_provider: &dyn TimeProvider,
    policy: TransitionPolicy,
    req: UpdateStatusRequest,
) -> Result<StatusHistoryEntry> {
    let current = repo
        .find_by_id(&req.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request {} not found", req.id)))?;

    if let Err(e) = policy.check(current.status, req.status) {
        return Err(AppError::InvalidState(e.to_string()));
    }
    if !current.status.can_transition_to(req.status) {
        warn!(
            request_id = %req.id,
            from = %current.status,
            to = %req.status,
            "Status change outside the lifecycle graph"
        );
    }

    let note = req
        .note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_note(req.status));

    let entry = StatusHistoryEntry {
        status: req.status,
        timestamp: time_provider.now_millis(),
        note,
    };

    repo.append_status(&req.id, &entry).await?;

    info!(
        request_id = %req.id,
        tracking_id = %current.tracking_id,
        from = %current.status,
        to = %entry.status,
        "Request status updated"
    );

    Ok(entry)
}
