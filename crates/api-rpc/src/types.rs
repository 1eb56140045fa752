//! RPC Request/Response Types
//!
//! Every method takes a single positional object parameter. Staff methods
//! carry `staff_token` alongside their own fields.

use cctv_core::application::request::RequestDraft;
use cctv_core::domain::{
    DeliveryMethod, Request, RequestId, RequestStatus, StatusHistoryEntry, TrackingId,
};
use cctv_core::port::{RequestFilter, StatusCount};
use serde::{Deserialize, Serialize};

/// request.submit.v1 - Public submission
pub type SubmitRequest = RequestDraft;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub tracking_id: TrackingId,
    pub status: RequestStatus,
}

/// request.track.v1 - Public lookup by tracking ID
#[derive(Debug, Deserialize, Serialize)]
pub struct TrackRequest {
    pub tracking_id: String,
}

/// Incident date and time window as shown to the citizen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentWindow {
    pub date: String,
    pub time_start: String,
    pub time_end: String,
}

/// What a citizen sees on the tracking page (no applicant identity data)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackResponse {
    pub tracking_id: TrackingId,
    pub status: RequestStatus,
    pub status_history: Vec<StatusHistoryEntry>,
    pub event_type: String,
    pub location: String,
    pub incident: IncidentWindow,
    pub delivery_method: DeliveryMethod,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Request> for TrackResponse {
    fn from(request: Request) -> Self {
        Self {
            tracking_id: request.tracking_id,
            status: request.status,
            status_history: request.status_history,
            event_type: request.incident.event_type,
            location: request.incident.location,
            incident: IncidentWindow {
                date: request.incident.date.to_string(),
                time_start: request.incident.time_start.format("%H:%M").to_string(),
                time_end: request.incident.time_end.format("%H:%M").to_string(),
            },
            delivery_method: request.delivery_method,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// request.update_status.v1 - Staff status change
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub staff_token: Option<String>,
    pub id: RequestId,
    pub status: RequestStatus,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusResponse {
    pub id: RequestId,
    pub entry: StatusHistoryEntry,
}

/// request.get.v1 - Staff fetch by store ID
#[derive(Debug, Deserialize, Serialize)]
pub struct GetRequest {
    #[serde(default)]
    pub staff_token: Option<String>,
    pub id: RequestId,
}

/// request.list.v1 / request.watch.v1 - Dashboard listing
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ListRequest {
    #[serde(default)]
    pub staff_token: Option<String>,
    #[serde(flatten)]
    pub filter: RequestFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub requests: Vec<Request>,
}

/// admin.stats.v1 - Dashboard counters
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StatsRequest {
    #[serde(default)]
    pub staff_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
    pub uptime_seconds: i64,
}
