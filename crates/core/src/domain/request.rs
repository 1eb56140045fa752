// Request Domain Model - the footage request and its status lifecycle

use super::error::{DomainError, Result};
use super::tracking::TrackingId;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Request ID (store-assigned, UUID v4)
pub type RequestId = String;

/// Request Status
///
/// pending -> {verifying, searching, rejected}
/// verifying -> {searching, completed, rejected}
/// searching -> {completed, rejected}
/// completed, rejected: terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Verifying,
    Searching,
    Completed,
    Rejected,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 5] = [
        RequestStatus::Pending,
        RequestStatus::Verifying,
        RequestStatus::Searching,
        RequestStatus::Completed,
        RequestStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Verifying => "verifying",
            RequestStatus::Searching => "searching",
            RequestStatus::Completed => "completed",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Rejected)
    }

    /// Whether `next` is an edge of the lifecycle graph
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pending, Verifying)
                | (Pending, Searching)
                | (Pending, Rejected)
                | (Verifying, Searching)
                | (Verifying, Completed)
                | (Verifying, Rejected)
                | (Searching, Completed)
                | (Searching, Rejected)
        )
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        RequestStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DomainError::UnknownStatus(s.to_string()))
    }
}

/// How staff status changes are checked against the lifecycle graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any status may be set from any other (last write wins)
    #[default]
    Permissive,
    /// Only graph edges are accepted
    Strict,
}

impl TransitionPolicy {
    pub fn check(&self, from: RequestStatus, to: RequestStatus) -> Result<()> {
        match self {
            TransitionPolicy::Strict if !from.can_transition_to(to) => {
                Err(DomainError::InvalidStatusTransition {
                    from: from.to_string(),
                    to: to.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Citizen's chosen channel for receiving footage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    ChatApp,
    InPerson,
}

impl DeliveryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::ChatApp => "chat_app",
            DeliveryMethod::InPerson => "in_person",
        }
    }
}

impl FromStr for DeliveryMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "chat_app" => Ok(DeliveryMethod::ChatApp),
            "in_person" => Ok(DeliveryMethod::InPerson),
            other => Err(DomainError::UnknownDeliveryMethod(other.to_string())),
        }
    }
}

/// One entry of the append-only status log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: RequestStatus,
    pub timestamp: i64, // epoch ms
    pub note: String,
}

/// WGS84 point picked on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(DomainError::ValidationError(format!(
                "Coordinates out of range: ({}, {})",
                lat, lng
            )));
        }
        Ok(Self { lat, lng })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub name: String,
    pub national_id: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub event_type: String,
    #[serde(default)]
    pub event_subtype: Option<String>,
    pub date: NaiveDate,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    pub description: String,
    pub location: String,
    pub coordinates: Coordinates,
}

/// Links returned by the attachment store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachments {
    #[serde(default)]
    pub id_card: Option<String>,
    #[serde(default)]
    pub report: Option<String>,
    #[serde(default)]
    pub scene: Vec<String>,
}

impl Attachments {
    pub fn is_empty(&self) -> bool {
        self.id_card.is_none() && self.report.is_none() && self.scene.is_empty()
    }
}

/// Request Entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub tracking_id: TrackingId,
    pub status: RequestStatus,
    pub status_history: Vec<StatusHistoryEntry>,

    pub applicant: Applicant,
    pub incident: Incident,
    pub delivery_method: DeliveryMethod,
    pub attachments: Attachments,

    pub created_at: i64, // epoch ms
    pub updated_at: i64, // epoch ms
}

/// Note recorded with the seed history entry
pub const SUBMITTED_NOTE: &str = "Request submitted";

impl Request {
    /// Create a new pending request
    ///
    /// ID and timestamp are injected so that tests stay deterministic. The
    /// history is seeded with exactly one `pending` entry.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        tracking_id: TrackingId,
        created_at: i64,
        applicant: Applicant,
        incident: Incident,
        delivery_method: DeliveryMethod,
        attachments: Attachments,
    ) -> Self {
        Self {
            id: id.into(),
            tracking_id,
            status: RequestStatus::Pending,
            status_history: vec![StatusHistoryEntry {
                status: RequestStatus::Pending,
                timestamp: created_at,
                note: SUBMITTED_NOTE.to_string(),
            }],
            applicant,
            incident,
            delivery_method,
            attachments,
            created_at,
            updated_at: created_at,
        }
    }

    /// Overwrite the status and append one history entry
    pub fn apply_status(
        &mut self,
        status: RequestStatus,
        note: impl Into<String>,
        now_millis: i64,
    ) -> &StatusHistoryEntry {
        self.status = status;
        self.updated_at = now_millis;
        self.status_history.push(StatusHistoryEntry {
            status,
            timestamp: now_millis,
            note: note.into(),
        });
        // Just pushed
        &self.status_history[self.status_history.len() - 1]
    }

    /// History is non-empty and its tail matches the current status
    ///
    /// Not enforced by the store; concurrent staff edits can break it.
    pub fn history_is_consistent(&self) -> bool {
        self.status_history
            .last()
            .is_some_and(|entry| entry.status == self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> Request {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        Request::new(
            "req-1",
            TrackingId::new(date, 4321),
            1_000,
            Applicant {
                name: "Somchai".to_string(),
                national_id: "1100000000001".to_string(),
                phone: "0812345678".to_string(),
                email: None,
            },
            Incident {
                event_type: "ACCIDENT".to_string(),
                event_subtype: None,
                date,
                time_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                time_end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                description: "Motorbike collision".to_string(),
                location: "Rawai Beach".to_string(),
                coordinates: Coordinates::new(7.78, 98.31).unwrap(),
            },
            DeliveryMethod::ChatApp,
            Attachments::default(),
        )
    }

    #[test]
    fn test_new_request_is_pending_with_seed_entry() {
        let req = sample_request();
        assert_eq!(req.status, RequestStatus::Pending);
        assert_eq!(req.status_history.len(), 1);
        assert_eq!(req.status_history[0].status, RequestStatus::Pending);
        assert_eq!(req.status_history[0].timestamp, 1_000);
        assert!(req.history_is_consistent());
    }

    #[test]
    fn test_apply_status_appends() {
        let mut req = sample_request();
        req.apply_status(RequestStatus::Verifying, "checking ID card", 2_000);
        req.apply_status(RequestStatus::Completed, "footage found", 3_000);

        assert_eq!(req.status, RequestStatus::Completed);
        assert_eq!(req.updated_at, 3_000);
        let statuses: Vec<_> = req.status_history.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                RequestStatus::Pending,
                RequestStatus::Verifying,
                RequestStatus::Completed
            ]
        );
    }

    #[test]
    fn test_lifecycle_graph() {
        use RequestStatus::*;
        assert!(Pending.can_transition_to(Verifying));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Completed));
        assert!(Verifying.can_transition_to(Completed));
        assert!(!Searching.can_transition_to(Verifying));

        for terminal in [Completed, Rejected] {
            assert!(terminal.is_terminal());
            for next in RequestStatus::ALL {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_policy_check() {
        use RequestStatus::*;
        assert!(TransitionPolicy::Permissive.check(Completed, Pending).is_ok());
        assert!(TransitionPolicy::Strict.check(Pending, Searching).is_ok());

        let err = TransitionPolicy::Strict.check(Pending, Completed).unwrap_err();
        assert!(err.to_string().contains("pending -> completed"));
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in RequestStatus::ALL {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), status);
        }
        assert!("PENDING".parse::<RequestStatus>().is_err());
    }

    #[test]
    fn test_coordinates_range() {
        assert!(Coordinates::new(7.78, 98.31).is_ok());
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
    }
}
