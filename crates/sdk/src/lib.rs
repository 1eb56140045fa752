//! CCTV SDK - Rust Client Library
//!
//! Client for the CCTV footage request service daemon.
//!
//! # Example
//!
//! ```no_run
//! use cctv_sdk::{CctvClient, RequestStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let staff = CctvClient::connect("http://127.0.0.1:9530")
//!         .await?
//!         .with_staff_token("s3cret");
//!
//!     let pending = staff.list(Default::default()).await?;
//!     for request in pending {
//!         staff
//!             .update_status(request.id, RequestStatus::Verifying, None)
//!             .await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use cctv_core::domain::{Applicant, DeliveryMethod, Request, RequestStatus};
pub use cctv_core::port::RequestFilter;
pub use client::{CctvClient, DashboardWatch};
pub use error::{code, Result, SdkError};
pub use types::{
    AttachmentFile, AttachmentSlot, IncidentDraft, IncidentWindow, ListResponse, RequestDraft,
    StatsResponse, SubmitResponse, TrackResponse, UpdateStatusResponse,
};
