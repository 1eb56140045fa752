// Submission alert content

use crate::domain::{DeliveryMethod, Request};
use crate::port::Alert;

pub const ALERT_TITLE: &str = "New CCTV footage request";

/// Build the staff alert for a freshly submitted request
pub fn submission_alert(request: &Request) -> Alert {
    let incident = &request.incident;

    let event = match &incident.event_subtype {
        Some(subtype) if !subtype.is_empty() => format!("{} / {}", incident.event_type, subtype),
        _ => incident.event_type.clone(),
    };

    let delivery = match request.delivery_method {
        DeliveryMethod::ChatApp => "Chat app",
        DeliveryMethod::InPerson => "In person",
    };

    Alert {
        title: ALERT_TITLE.to_string(),
        tracking_id: request.tracking_id.to_string(),
        fields: vec![
            ("Tracking ID".to_string(), request.tracking_id.to_string()),
            ("Event".to_string(), event),
            ("Location".to_string(), incident.location.clone()),
            ("Date".to_string(), incident.date.format("%Y-%m-%d").to_string()),
            (
                "Time".to_string(),
                format!(
                    "{} - {}",
                    incident.time_start.format("%H:%M"),
                    incident.time_end.format("%H:%M")
                ),
            ),
            ("Applicant".to_string(), request.applicant.name.clone()),
            ("Phone".to_string(), request.applicant.phone.clone()),
            ("Delivery".to_string(), delivery.to_string()),
        ],
    }
}
