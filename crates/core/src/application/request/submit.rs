// Submit Use Case

use crate::domain::{
    Applicant, Attachments, Coordinates, DeliveryMethod, Incident, Request, TrackingId,
};
use crate::error::{AppError, Result};
use crate::port::{
    AttachmentStore, AttachmentUpload, IdProvider, RequestRepository, TimeProvider,
    TrackingIdProvider,
};
use base64::Engine;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Incident as entered on the public form (coordinates may be missing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentDraft {
    pub event_type: String,
    #[serde(default)]
    pub event_subtype: Option<String>,
    pub date: NaiveDate,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    #[serde(default)]
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

/// Which attachment field a file fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentSlot {
    IdCard,
    Report,
    Scene,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentFile {
    pub slot: AttachmentSlot,
    pub filename: String,
    pub mime_type: String,
    /// File content, base64 encoded
    pub base64: String,
}

/// Public submission payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDraft {
    pub applicant: Applicant,
    pub incident: IncidentDraft,
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub files: Vec<AttachmentFile>,
}

/// Attachment caps applied before anything is uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentLimits {
    /// Decoded size cap per file
    pub max_bytes: usize,
    pub max_files: usize,
}

impl AttachmentLimits {
    pub const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;
    pub const DEFAULT_MAX_FILES: usize = 8;
}

impl Default for AttachmentLimits {
    fn default() -> Self {
        Self {
            max_bytes: Self::DEFAULT_MAX_BYTES,
            max_files: Self::DEFAULT_MAX_FILES,
        }
    }
}

/// Strip a `data:<mime>;base64,` prefix if the browser left one on
fn strip_data_url(payload: &str) -> &str {
    match payload.split_once(";base64,") {
        Some((head, body)) if head.starts_with("data:") => body,
        _ => payload,
    }
}

/// Payload as sent to the store: no data-URL prefix, no surrounding whitespace
fn normalized_payload(payload: &str) -> &str {
    strip_data_url(payload.trim()).trim()
}

/// Check one file decodes and fits under the cap
fn check_payload(file: &AttachmentFile, max_bytes: usize) -> Result<()> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(normalized_payload(&file.base64))
        .map_err(|e| {
            AppError::Validation(format!("{} is not valid base64: {}", file.filename, e))
        })?;

    if decoded.is_empty() {
        return Err(AppError::Validation(format!("{} is empty", file.filename)));
    }
    if decoded.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "{} is {} bytes, limit is {}",
            file.filename,
            decoded.len(),
            max_bytes
        )));
    }
    Ok(())
}

/// Validate a draft and return its coordinates
///
/// Every attachment is checked here, so a bad file rejects the whole
/// submission before the first upload.
pub fn validate_request(draft: &RequestDraft, limits: &AttachmentLimits) -> Result<Coordinates> {
    let (Some(lat), Some(lng)) = (draft.incident.lat, draft.incident.lng) else {
        return Err(AppError::Validation(
            "Incident coordinates are required (pick a point on the map)".to_string(),
        ));
    };
    let coordinates =
        Coordinates::new(lat, lng).map_err(|e| AppError::Validation(e.to_string()))?;

    if draft.applicant.name.trim().is_empty() {
        return Err(AppError::Validation("Applicant name is empty".to_string()));
    }
    if draft.applicant.phone.trim().is_empty() {
        return Err(AppError::Validation("Applicant phone is empty".to_string()));
    }
    if draft.incident.event_type.trim().is_empty() {
        return Err(AppError::Validation("Event type is empty".to_string()));
    }
    if draft.incident.time_end < draft.incident.time_start {
        return Err(AppError::Validation(format!(
            "Time window ends before it starts ({} > {})",
            draft.incident.time_start, draft.incident.time_end
        )));
    }

    for slot in [AttachmentSlot::IdCard, AttachmentSlot::Report] {
        if draft.files.iter().filter(|f| f.slot == slot).count() > 1 {
            return Err(AppError::Validation(format!(
                "At most one {:?} attachment is allowed",
                slot
            )));
        }
    }
    if let Some(file) = draft.files.iter().find(|f| f.filename.trim().is_empty()) {
        return Err(AppError::Validation(format!(
            "Attachment for {:?} has no filename",
            file.slot
        )));
    }
    if draft.files.len() > limits.max_files {
        return Err(AppError::Validation(format!(
            "{} attachments sent, limit is {}",
            draft.files.len(),
            limits.max_files
        )));
    }
    for file in &draft.files {
        check_payload(file, limits.max_bytes)?;
    }

    Ok(coordinates)
}

/// Upload files one at a time into the tracking ID's folder
///
/// Stops at the first failure; files already uploaded are left in place.
async fn upload_attachments(
    store: &dyn AttachmentStore,
    tracking_id: &TrackingId,
    files: Vec<AttachmentFile>,
) -> Result<Attachments> {
    let mut attachments = Attachments::default();

    for file in files {
        let upload = AttachmentUpload {
            filename: file.filename,
            mime_type: file.mime_type,
            base64: normalized_payload(&file.base64).to_string(),
            folder_name: tracking_id.to_string(),
        };
        let link = store.upload(&upload).await?;
        debug!(tracking_id = %tracking_id, slot = ?file.slot, "Attachment uploaded");

        match file.slot {
            AttachmentSlot::IdCard => attachments.id_card = Some(link),
            AttachmentSlot::Report => attachments.report = Some(link),
            AttachmentSlot::Scene => attachments.scene.push(link),
        }
    }

    Ok(attachments)
}

/// Execute submit use case
///
/// # Arguments
///
/// * `repo` - Request repository
/// * `attachment_store` - Upload endpoint
/// * `id_provider` - Store ID generator (injected for determinism)
/// * `tracking_ids` - Tracking ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `limits` - Attachment caps
/// * `draft` - Public submission payload
pub async fn execute(
    repo: &dyn RequestRepository,
    attachment_store: &dyn AttachmentStore,
    id_provider: &dyn IdProvider,
    tracking_ids: &dyn TrackingIdProvider,
    time_provider: &dyn TimeProvider,
    limits: &AttachmentLimits,
    draft: RequestDraft,
) -> Result<Request> {
    let coordinates = validate_request(&draft, limits)?;

    let now = time_provider.now_millis();
    let tracking_id = tracking_ids.generate(now);

    let attachments = upload_attachments(attachment_store, &tracking_id, draft.files).await?;

    let incident = draft.incident;
    let request = Request::new(
        id_provider.generate_id(),
        tracking_id,
        now,
        draft.applicant,
        Incident {
            event_type: incident.event_type,
            event_subtype: incident.event_subtype,
            date: incident.date,
            time_start: incident.time_start,
            time_end: incident.time_end,
            description: incident.description,
            location: incident.location,
            coordinates,
        },
        draft.delivery_method,
        attachments,
    );

    repo.insert(&request).await?;

    info!(
        request_id = %request.id,
        tracking_id = %request.tracking_id,
        event_type = %request.incident.event_type,
        "Request submitted"
    );

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_data_url() {
        assert_eq!(strip_data_url("data:image/png;base64,AAAA"), "AAAA");
        assert_eq!(strip_data_url("AAAA"), "AAAA");
        assert_eq!(normalized_payload(" data:image/png;base64,AAAA\n"), "AAAA");
    }

    #[test]
    fn test_check_payload() {
        let file = |b64: &str| AttachmentFile {
            slot: AttachmentSlot::Scene,
            filename: "scene.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            base64: b64.to_string(),
        };

        assert!(check_payload(&file("aGVsbG8="), 5).is_ok());
        assert!(check_payload(&file("data:image/jpeg;base64,aGVsbG8="), 5).is_ok());
        assert!(matches!(
            check_payload(&file("aGVsbG8="), 4),
            Err(AppError::Validation(ref m)) if m.contains("limit")
        ));
        assert!(matches!(
            check_payload(&file("not base64!"), 5),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            check_payload(&file(""), 5),
            Err(AppError::Validation(ref m)) if m.contains("empty")
        ));
    }
}
