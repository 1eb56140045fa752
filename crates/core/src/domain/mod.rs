// Domain Layer - Pure business logic and entities

pub mod error;
pub mod request;
pub mod tracking;
pub mod view;

// Re-exports
pub use error::DomainError;
pub use request::{
    Applicant, Attachments, Coordinates, DeliveryMethod, Incident, Request, RequestId,
    RequestStatus, StatusHistoryEntry, TransitionPolicy,
};
pub use tracking::TrackingId;
pub use view::{Navigation, View};
