//! Wire types for the request service's JSON-RPC methods

use cctv_core::domain::{
    DeliveryMethod, Request, RequestId, RequestStatus, StatusHistoryEntry, TrackingId,
};
use cctv_core::port::{RequestFilter, StatusCount};
use serde::{Deserialize, Serialize};

pub use cctv_core::application::request::{
    AttachmentFile, AttachmentSlot, IncidentDraft, RequestDraft,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub tracking_id: TrackingId,
    pub status: RequestStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct TrackRequest {
    pub tracking_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentWindow {
    pub date: String,
    pub time_start: String,
    pub time_end: String,
}

/// Public tracking view of a request
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

#[derive(Debug, Serialize)]
pub(crate) struct UpdateStatusRequest {
    pub staff_token: Option<String>,
    pub id: RequestId,
    pub status: RequestStatus,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusResponse {
    pub id: RequestId,
    pub entry: StatusHistoryEntry,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetRequest {
    pub staff_token: Option<String>,
    pub id: RequestId,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListRequest {
    pub staff_token: Option<String>,
    #[serde(flatten)]
    pub filter: RequestFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub requests: Vec<Request>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatsRequest {
    pub staff_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
    pub uptime_seconds: i64,
}

impl StatsResponse {
    pub fn count(&self, status: RequestStatus) -> i64 {
        self.by_status
            .iter()
            .find(|c| c.status == status)
            .map_or(0, |c| c.count)
    }
}
