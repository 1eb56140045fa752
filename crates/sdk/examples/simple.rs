//! Submit a request and follow it
//!
//! 1. Start the daemon: `cargo run --package cctv-daemon`
//! 2. Run this example: `cargo run --package cctv-sdk --example simple`

use cctv_sdk::{Applicant, CctvClient, DeliveryMethod, IncidentDraft, RequestDraft, RequestStatus};
use chrono::{NaiveDate, NaiveTime};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = CctvClient::connect("http://127.0.0.1:9530").await?;

    let submitted = client
        .submit(RequestDraft {
            applicant: Applicant {
                name: "Somchai Jaidee".to_string(),
                national_id: "1100000000001".to_string(),
                phone: "0812345678".to_string(),
                email: None,
            },
            incident: IncidentDraft {
                event_type: "ACCIDENT".to_string(),
                event_subtype: None,
                date: NaiveDate::from_ymd_opt(2024, 5, 1).ok_or("bad date")?,
                time_start: NaiveTime::from_hms_opt(9, 0, 0).ok_or("bad time")?,
                time_end: NaiveTime::from_hms_opt(9, 30, 0).ok_or("bad time")?,
                description: "Motorbike collision near the beach road".to_string(),
                location: "Rawai Beach".to_string(),
                lat: Some(7.78),
                lng: Some(98.31),
            },
            delivery_method: DeliveryMethod::ChatApp,
            files: vec![],
        })
        .await?;
    println!("Submitted: {}", submitted.tracking_id);

    let tracked = client.track(submitted.tracking_id.as_str()).await?;
    println!("Status: {}", tracked.status);

    let staff = client.with_staff_token(std::env::var("CCTV_STAFF_TOKEN").unwrap_or_default());
    if let Some(request) = staff.list(Default::default()).await?.into_iter().next() {
        staff
            .update_status(request.id, RequestStatus::Completed, Some("พบภาพเหตุการณ์".into()))
            .await?;
    }

    let tracked = staff.track(submitted.tracking_id.as_str()).await?;
    for entry in tracked.status_history {
        println!("  {} {} {}", entry.timestamp, entry.status, entry.note);
    }

    Ok(())
}
